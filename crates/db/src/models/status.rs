//! Status helper enums mapping to SMALLINT lookup tables.
//!
//! Each enum variant's discriminant matches the seed data
//! in the corresponding `*_statuses` database table.

use serde::Serializer;

/// Status ID type matching SMALLINT in the database.
pub type StatusId = i16;

macro_rules! define_status_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident = $val:literal => $label:literal ),+ $(,)?
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

            /// Look up a variant by its database status ID.
            pub fn from_id(id: StatusId) -> Option<Self> {
                match id {
                    $( $val => Some($name::$variant), )+
                    _ => None,
                }
            }

            /// The lowercase name used in the lookup table and in API payloads.
            pub fn as_str(self) -> &'static str {
                match self {
                    $( $name::$variant => $label, )+
                }
            }
        }

        impl From<$name> for StatusId {
            fn from(value: $name) -> Self {
                value as StatusId
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl serde::Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }
    };
}

define_status_enum! {
    /// Image edit task lifecycle status.
    TaskStatus {
        Pending = 1 => "pending",
        Running = 2 => "running",
        Succeeded = 3 => "succeeded",
        Failed = 4 => "failed",
    }
}

/// Terminal statuses: succeeded, failed.
pub const TERMINAL_TASK_STATUSES: [StatusId; 2] =
    [TaskStatus::Succeeded as StatusId, TaskStatus::Failed as StatusId];

impl TaskStatus {
    /// `succeeded` and `failed` never transition again.
    pub fn is_terminal(self) -> bool {
        matches!(self, TaskStatus::Succeeded | TaskStatus::Failed)
    }

    /// Position in the pending -> running -> terminal order.
    fn rank(self) -> u8 {
        match self {
            TaskStatus::Pending => 0,
            TaskStatus::Running => 1,
            TaskStatus::Succeeded | TaskStatus::Failed => 2,
        }
    }

    /// Whether moving from `self` to `next` is a forward transition.
    ///
    /// Skipping `running` is allowed; staying put, moving backwards, or
    /// leaving a terminal state is not.
    pub fn can_advance_to(self, next: TaskStatus) -> bool {
        !self.is_terminal() && next.rank() > self.rank()
    }
}

/// Serialize a raw `status_id` column as its lowercase name.
pub fn serialize_task_status<S: Serializer>(id: &StatusId, serializer: S) -> Result<S::Ok, S::Error> {
    match TaskStatus::from_id(*id) {
        Some(status) => serializer.serialize_str(status.as_str()),
        None => serializer.serialize_str("unknown"),
    }
}
