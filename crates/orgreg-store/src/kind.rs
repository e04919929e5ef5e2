//! Entity kinds and their storage schemas.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// One of the two record collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityKind {
    /// A registered company, unique by tax-registration code.
    Organization,
    /// A user belonging to exactly one organization.
    Member,
}

/// Field name holding the member → organization reference.
pub const ORGANIZATION_REFERENCE_FIELD: &str = "company_id";

/// Field name of the organization tax-registration code.
pub const TAX_CODE_FIELD: &str = "cnpj";

/// Field name of the member contact address.
pub const EMAIL_FIELD: &str = "email";

impl EntityKind {
    pub const ALL: [EntityKind; 2] = [EntityKind::Organization, EntityKind::Member];

    /// Partition directory under the data root.
    pub fn dir_name(self) -> &'static str {
        match self {
            Self::Organization => "companies",
            Self::Member => "users",
        }
    }

    /// Name of the server-assigned identifier field.
    pub fn id_field(self) -> &'static str {
        match self {
            Self::Organization => "company_id",
            Self::Member => "id_user",
        }
    }

    /// Fields every create and full replace must carry.
    pub fn required_fields(self) -> &'static [&'static str] {
        match self {
            Self::Organization => &[TAX_CODE_FIELD, "name", "area_of_activity"],
            Self::Member => &["name", ORGANIZATION_REFERENCE_FIELD, EMAIL_FIELD, "password"],
        }
    }

    /// Field that must be unique across the collection, if any.
    pub fn unique_field(self) -> Option<&'static str> {
        match self {
            Self::Organization => Some(TAX_CODE_FIELD),
            Self::Member => None,
        }
    }

    /// Human-facing label used in messages.
    pub fn label(self) -> &'static str {
        match self {
            Self::Organization => "Company",
            Self::Member => "User",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Organization => "organization",
            Self::Member => "member",
        }
    }
}

impl Display for EntityKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "organization" | "company" | "companies" => Ok(Self::Organization),
            "member" | "user" | "users" => Ok(Self::Member),
            other => Err(format!(
                "unknown entity kind `{other}` (expected organization or member)"
            )),
        }
    }
}
