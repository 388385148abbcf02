//! Action request records.
//!
//! An [`ActionRequest`] only lives for a single HTTP exchange: it is built,
//! serialized into the response body and dropped. Nothing here is stored.

use crate::ids::ActionId;
use serde::{Deserialize, Serialize};

/// Operation name used by the stub GET handler.
pub const REBOOT_DEVICE: &str = "rebootDevice";

/// Device serial used by the stub GET handler.
pub const TEST_SERIAL: &str = "testSerial";

/// A device command addressed by a generated identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionRequest {
    pub id: ActionId,
    pub action: Operation,
}

/// What to do, and to which device.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operation {
    pub name: String,
    /// Target device; left out of the JSON form when empty.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub serial: String,
}

impl ActionRequest {
    /// Build a new request with a freshly generated id.
    ///
    /// Neither field is validated; empty strings are accepted as-is.
    pub fn new(serial: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: ActionId::new(),
            action: Operation {
                name: name.into(),
                serial: serial.into(),
            },
        }
    }
}
