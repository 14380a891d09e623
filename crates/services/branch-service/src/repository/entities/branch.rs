//! Branch database entity for SeaORM.

use sea_orm::entity::prelude::*;
use sea_orm::Set;

use domain::Branch;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "branchs")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub logo: Option<String>,
    #[sea_orm(column_name = "nama_cabang")]
    pub name: String,
    #[sea_orm(column_name = "alamat")]
    pub address: String,
    #[sea_orm(column_name = "kota")]
    pub city: String,
    #[sea_orm(column_name = "kontak")]
    pub contact: String,
    pub email: String,
    #[sea_orm(column_name = "koordinat")]
    pub coordinate: String,
    pub sipa: String,
    pub is_private: bool,
    #[sea_orm(column_name = "pettycash")]
    pub petty_cash: i32,
    pub ip: Option<String>,
    pub key_machine: Option<String>,
    pub ip_machine: Option<String>,
    pub bpom_mode: bool,
    pub ppn: i16,
    /// IANA zone name, stored in the legacy `datetime` column
    #[sea_orm(column_name = "datetime")]
    pub timezone: Option<String>,
    pub upline: String,
    #[sea_orm(column_name = "is_manajemen")]
    pub is_management: Option<bool>,
    #[sea_orm(column_name = "roundppn")]
    pub round_ppn: Option<String>,
    pub regist_date: Option<Date>,
    pub expire_date: Option<Date>,
    pub is_paid: Option<bool>,
    pub dev: Option<bool>,
    /// Soft delete flag
    #[sea_orm(column_name = "is_delete")]
    pub is_deleted: Option<bool>,
    pub last_update_dashboard: Option<Date>,
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
    #[sea_orm(column_name = "id_klien")]
    pub client_id: String,
    #[sea_orm(column_name = "no_whatsapp")]
    pub whatsapp_number: Option<String>,
    pub xendit_id: Option<String>,
    pub wallet_id: Option<String>,
    pub access_id: Option<String>,
    pub access_status: Option<bool>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Convert database model to domain entity
impl From<Model> for Branch {
    fn from(model: Model) -> Self {
        Branch {
            id: model.id,
            logo: model.logo,
            name: model.name,
            address: model.address,
            city: model.city,
            contact: model.contact,
            email: model.email,
            coordinate: model.coordinate,
            sipa: model.sipa,
            is_private: model.is_private,
            petty_cash: model.petty_cash,
            ip: model.ip,
            key_machine: model.key_machine,
            ip_machine: model.ip_machine,
            bpom_mode: model.bpom_mode,
            ppn: model.ppn,
            timezone: model.timezone,
            upline: model.upline,
            is_management: model.is_management,
            round_ppn: model.round_ppn,
            regist_date: model.regist_date,
            expire_date: model.expire_date,
            is_paid: model.is_paid,
            dev: model.dev,
            is_deleted: model.is_deleted,
            last_update_dashboard: model.last_update_dashboard,
            avg_guest: model.avg_guest,
            avg_transaction: model.avg_transaction,
            guest_comment_rate: model.guest_comment_rate,
            top_product: model.top_product,
            top_services: model.top_services,
            top_prof_action: model.top_prof_action,
            guest_total_by_month: model.guest_total_by_month,
            trx_total_by_month: model.trx_total_by_month,
            chart_activity_by_month: model.chart_activity_by_month,
            chart_sales_by_year: model.chart_sales_by_year,
            rate_receptionist: model.rate_receptionist,
            rate_doctor: model.rate_doctor,
            rate_beautician: model.rate_beautician,
            client_id: model.client_id,
            whatsapp_number: model.whatsapp_number,
            xendit_id: model.xendit_id,
            wallet_id: model.wallet_id,
            access_id: model.access_id,
            access_status: model.access_status,
        }
    }
}

/// Fully populated active model, every column set
impl From<Branch> for ActiveModel {
    fn from(branch: Branch) -> Self {
        ActiveModel {
            id: Set(branch.id),
            logo: Set(branch.logo),
            name: Set(branch.name),
            address: Set(branch.address),
            city: Set(branch.city),
            contact: Set(branch.contact),
            email: Set(branch.email),
            coordinate: Set(branch.coordinate),
            sipa: Set(branch.sipa),
            is_private: Set(branch.is_private),
            petty_cash: Set(branch.petty_cash),
            ip: Set(branch.ip),
            key_machine: Set(branch.key_machine),
            ip_machine: Set(branch.ip_machine),
            bpom_mode: Set(branch.bpom_mode),
            ppn: Set(branch.ppn),
            timezone: Set(branch.timezone),
            upline: Set(branch.upline),
            is_management: Set(branch.is_management),
            round_ppn: Set(branch.round_ppn),
            regist_date: Set(branch.regist_date),
            expire_date: Set(branch.expire_date),
            is_paid: Set(branch.is_paid),
            dev: Set(branch.dev),
            is_deleted: Set(branch.is_deleted),
            last_update_dashboard: Set(branch.last_update_dashboard),
            avg_guest: Set(branch.avg_guest),
            avg_transaction: Set(branch.avg_transaction),
            guest_comment_rate: Set(branch.guest_comment_rate),
            top_product: Set(branch.top_product),
            top_services: Set(branch.top_services),
            top_prof_action: Set(branch.top_prof_action),
            guest_total_by_month: Set(branch.guest_total_by_month),
            trx_total_by_month: Set(branch.trx_total_by_month),
            chart_activity_by_month: Set(branch.chart_activity_by_month),
            chart_sales_by_year: Set(branch.chart_sales_by_year),
            rate_receptionist: Set(branch.rate_receptionist),
            rate_doctor: Set(branch.rate_doctor),
            rate_beautician: Set(branch.rate_beautician),
            client_id: Set(branch.client_id),
            whatsapp_number: Set(branch.whatsapp_number),
            xendit_id: Set(branch.xendit_id),
            wallet_id: Set(branch.wallet_id),
            access_id: Set(branch.access_id),
            access_status: Set(branch.access_status),
        }
    }
}
