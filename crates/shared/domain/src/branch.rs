//! Branch domain entity and related types.
//!
//! A branch is either a management record (head office, upline `"0"`) or a
//! regular branch hanging under a management record.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_CITY, DEFAULT_CONTACT, DEFAULT_EXPIRE_DATE, DEFAULT_ROUND_PPN, DEFAULT_TIMEZONE,
    MANAGEMENT_UPLINE,
};
use crate::error::{DomainError, DomainResult};

/// Branch domain entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Branch {
    pub id: String,
    pub logo: Option<String>,
    pub name: String,
    pub address: String,
    pub city: String,
    pub contact: String,
    pub email: String,
    pub coordinate: String,
    pub sipa: String,
    pub is_private: bool,
    pub petty_cash: i32,
    pub ip: Option<String>,
    pub key_machine: Option<String>,
    pub ip_machine: Option<String>,
    pub bpom_mode: bool,
    pub ppn: i16,
    pub timezone: Option<String>,
    pub upline: String,
    pub is_management: Option<bool>,
    pub round_ppn: Option<String>,
    pub regist_date: Option<NaiveDate>,
    pub expire_date: Option<NaiveDate>,
    pub is_paid: Option<bool>,
    pub dev: Option<bool>,
    pub is_deleted: Option<bool>,
    pub last_update_dashboard: Option<NaiveDate>,
    pub avg_guest: Option<i32>,
    pub avg_transaction: Option<i32>,
    pub guest_comment_rate: Option<i32>,
    pub top_product: Option<String>,
    pub top_services: Option<String>,
    pub top_prof_action: Option<String>,
    pub guest_total_by_month: Option<i32>,
    pub trx_total_by_month: Option<i32>,
    pub chart_activity_by_month: Option<String>,
    pub chart_sales_by_year: Option<String>,
    pub rate_receptionist: Option<f64>,
    pub rate_doctor: Option<f64>,
    pub rate_beautician: Option<f64>,
    pub client_id: String,
    pub whatsapp_number: Option<String>,
    pub xendit_id: Option<String>,
    pub wallet_id: Option<String>,
    pub access_id: Option<String>,
    pub access_status: Option<bool>,
}

impl Branch {
    /// Build a management (head office) record with the registration defaults.
    pub fn management(cmd: CreateManagement, client_id: impl Into<String>) -> Self {
        let mut branch = Self::with_defaults(
            cmd.id,
            cmd.name,
            cmd.address,
            cmd.email,
            MANAGEMENT_UPLINE.to_string(),
            client_id.into(),
        );
        branch.is_management = Some(true);
        branch.is_paid = Some(false);
        branch
    }

    /// Build a regular branch under `cmd.upline`.
    ///
    /// A branch can neither be its own upline nor claim the management
    /// marker as its upline.
    pub fn branch(cmd: CreateBranch, client_id: impl Into<String>) -> DomainResult<Self> {
        let upline = cmd.upline.trim().to_string();
        if upline.is_empty() || upline == MANAGEMENT_UPLINE {
            return Err(DomainError::validation("Upline must reference a management id"));
        }
        if upline == cmd.id {
            return Err(DomainError::validation("A branch cannot be its own upline"));
        }

        let mut branch = Self::with_defaults(
            cmd.id,
            cmd.name,
            cmd.address,
            cmd.email,
            upline,
            client_id.into(),
        );
        branch.is_management = Some(false);
        branch.is_paid = Some(true);
        Ok(branch)
    }

    fn with_defaults(
        id: String,
        name: String,
        address: String,
        email: String,
        upline: String,
        client_id: String,
    ) -> Self {
        let (year, month, day) = DEFAULT_EXPIRE_DATE;
        Self {
            id,
            logo: None,
            name,
            address,
            city: DEFAULT_CITY.to_string(),
            contact: DEFAULT_CONTACT.to_string(),
            email,
            coordinate: String::new(),
            sipa: String::new(),
            is_private: false,
            petty_cash: 0,
            ip: None,
            key_machine: None,
            ip_machine: None,
            bpom_mode: true,
            ppn: 0,
            timezone: Some(DEFAULT_TIMEZONE.to_string()),
            upline,
            is_management: None,
            round_ppn: Some(DEFAULT_ROUND_PPN.to_string()),
            regist_date: None,
            expire_date: NaiveDate::from_ymd_opt(year, month, day),
            is_paid: None,
            dev: Some(false),
            is_deleted: Some(false),
            last_update_dashboard: None,
            avg_guest: Some(0),
            avg_transaction: Some(0),
            guest_comment_rate: Some(0),
            top_product: None,
            top_services: None,
            top_prof_action: None,
            guest_total_by_month: Some(0),
            trx_total_by_month: Some(0),
            chart_activity_by_month: None,
            chart_sales_by_year: None,
            rate_receptionist: Some(0.0),
            rate_doctor: Some(0.0),
            rate_beautician: Some(0.0),
            client_id,
            whatsapp_number: None,
            xendit_id: None,
            wallet_id: None,
            access_id: None,
            access_status: Some(false),
        }
    }

    /// Check if this is a management record
    pub fn is_management(&self) -> bool {
        self.is_management.unwrap_or(false)
    }

    /// Check if branch is soft deleted
    pub fn is_deleted(&self) -> bool {
        self.is_deleted.unwrap_or(false)
    }
}

/// Management registration data
#[derive(Debug, Clone, Deserialize)]
pub struct CreateManagement {
    pub id: String,
    pub name: String,
    pub address: String,
    pub email: String,
}

/// Branch registration data
#[derive(Debug, Clone, Deserialize)]
pub struct CreateBranch {
    pub id: String,
    pub name: String,
    pub address: String,
    pub email: String,
    pub upline: String,
}

/// Partial branch update. Only `Some` fields are written.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateBranch {
    pub name: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub contact: Option<String>,
    pub email: Option<String>,
    pub coordinate: Option<String>,
    pub whatsapp_number: Option<String>,
    pub logo: Option<String>,
}

impl UpdateBranch {
    /// True when no field would be written
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.address.is_none()
            && self.city.is_none()
            && self.contact.is_none()
            && self.email.is_none()
            && self.coordinate.is_none()
            && self.whatsapp_number.is_none()
            && self.logo.is_none()
    }
}

/// Branch response (safe to return to client)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct BranchResponse {
    /// Branch identifier
    pub id: String,
    /// Branch display name
    pub name: String,
    /// Street address
    pub address: String,
    pub city: String,
    pub contact: String,
    pub email: String,
    /// Upline id, `"0"` for management records
    pub upline: String,
    pub is_management: bool,
    pub is_paid: bool,
    /// Subscription expiry date
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expire_date: Option<NaiveDate>,
    pub client_id: String,
}

impl From<Branch> for BranchResponse {
    fn from(branch: Branch) -> Self {
        Self {
            is_management: branch.is_management(),
            is_paid: branch.is_paid.unwrap_or(false),
            id: branch.id,
            name: branch.name,
            address: branch.address,
            city: branch.city,
            contact: branch.contact,
            email: branch.email,
            upline: branch.upline,
            expire_date: branch.expire_date,
            client_id: branch.client_id,
        }
    }
}
