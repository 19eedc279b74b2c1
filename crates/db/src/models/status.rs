//! Status helper enums mapping to SMALLSERIAL/SMALLINT lookup tables.
//!
//! Each enum variant's discriminant matches the seed data order (1-based)
//! in the corresponding `*_statuses` database table.

/// Status ID type matching SMALLINT/SMALLSERIAL in the database.
pub type StatusId = i16;

macro_rules! define_status_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident = $val:expr ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[repr(i16)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub enum $name {
            $( $(#[$vmeta])* $variant = $val ),+
        }

        impl $name {
            /// Return the database status ID.
            pub fn id(self) -> StatusId {
                self as StatusId
            }
        }

        impl From<$name> for StatusId {
            fn from(value: $name) -> Self {
                value as StatusId
            }
        }
    };
}

define_status_enum! {
    /// Generation lifecycle: `Processing` is the only non-terminal state.
    GenerationStatus {
        Processing = 1,
        Completed = 2,
        Failed = 3,
    }
}

impl GenerationStatus {
    /// Whether this status permits no further transitions.
    pub fn is_terminal(self) -> bool {
        !matches!(self, GenerationStatus::Processing)
    }

    /// Lowercase name matching the seed data, for API responses.
    pub fn name(self) -> &'static str {
        match self {
            GenerationStatus::Processing => "processing",
            GenerationStatus::Completed => "completed",
            GenerationStatus::Failed => "failed",
        }
    }
}

define_status_enum! {
    /// Changelog document publication workflow.
    ChangelogStatus {
        Draft = 1,
        Review = 2,
        Published = 3,
        Archived = 4,
    }
}

impl ChangelogStatus {
    /// Lowercase name matching the seed data, for API responses.
    pub fn name(self) -> &'static str {
        match self {
            ChangelogStatus::Draft => "draft",
            ChangelogStatus::Review => "review",
            ChangelogStatus::Published => "published",
            ChangelogStatus::Archived => "archived",
        }
    }

    /// Parse a status name as sent by `POST /changelogs/{id}/status`.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "draft" => Some(ChangelogStatus::Draft),
            "review" => Some(ChangelogStatus::Review),
            "published" => Some(ChangelogStatus::Published),
            "archived" => Some(ChangelogStatus::Archived),
            _ => None,
        }
    }
}
