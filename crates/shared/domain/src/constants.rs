//! Domain-level constants.
//!
//! Defaults applied to every newly registered branch, plus the limits that
//! mirror the `branchs` table column sizes.

// =============================================================================
// Branch defaults
// =============================================================================

/// City assigned to new branches until the owner edits it
pub const DEFAULT_CITY: &str = "Bandung";

/// Placeholder contact number
pub const DEFAULT_CONTACT: &str = "-";

/// IANA timezone used for branch-local timestamps
pub const DEFAULT_TIMEZONE: &str = "Asia/Jakarta";

/// Tax rounding direction
pub const DEFAULT_ROUND_PPN: &str = "up";

/// Subscription expiry for new branches (year, month, day)
pub const DEFAULT_EXPIRE_DATE: (i32, u32, u32) = (2030, 1, 1);

/// Upline value marking a management (head office) record
pub const MANAGEMENT_UPLINE: &str = "0";

// =============================================================================
// Validation
// =============================================================================

/// Maximum branch id length
pub const MAX_BRANCH_ID_LENGTH: u64 = 10;

/// Maximum branch name length
pub const MAX_BRANCH_NAME_LENGTH: u64 = 150;

/// Maximum address length
pub const MAX_ADDRESS_LENGTH: u64 = 255;

/// Maximum email length
pub const MAX_EMAIL_LENGTH: u64 = 150;

// =============================================================================
// Authentication
// =============================================================================

/// Minimum JWT secret length (security requirement)
pub const MIN_JWT_SECRET_LENGTH: usize = 32;

/// Default access token lifetime in minutes
pub const DEFAULT_JWT_EXPIRATION_MINUTES: i64 = 60;

/// Authorization header prefix for Bearer tokens
pub const BEARER_TOKEN_PREFIX: &str = "Bearer ";
