// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

//! Versioned bincode envelopes for the SFDK key objects.

use crate::errors::{Result, SfdkError};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::trace;

/// Serialized form of every SFDK object: its name, its format version and the payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    pub name: String,
    pub version: u32,
    pub payload: Vec<u8>,
}

impl Envelope {
    pub fn seal<T: Serialize>(name: &str, version: u32, payload: &T) -> Result<Vec<u8>> {
        let envelope = Envelope {
            name: name.to_string(),
            version,
            payload: bincode::serialize(payload)?,
        };
        Ok(bincode::serialize(&envelope)?)
    }

    /// Reads an envelope for `name`, refusing other objects and any version newer than
    /// `supported`.
    pub fn open<T: DeserializeOwned>(name: &str, supported: u32, bytes: &[u8]) -> Result<T> {
        let envelope: Envelope = bincode::deserialize(bytes)?;
        if envelope.name != name {
            return Err(SfdkError::WrongObject {
                expected: name.to_string(),
                found: envelope.name,
            });
        }
        if envelope.version > supported {
            return Err(SfdkError::LaterVersion {
                name: envelope.name,
                version: envelope.version,
                supported,
            });
        }
        trace!(name, version = envelope.version, "opened envelope");
        Ok(bincode::deserialize(&envelope.payload)?)
    }
}
