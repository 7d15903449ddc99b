// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::num::NonZeroUsize;
use std::thread;

use epassport_common::ContentFraming;
use epassport_validation::SignatureSettings;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentSettings {
    /// How the LDS Security Object is framed inside `eContent`.
    pub framing: ContentFraming,
}

/// Verification settings.
///
/// Every field has a default, so a JSON document only needs the keys it
/// changes:
///
/// ```json
/// { "content": { "framing": "encapsulated_content_info" },
///   "signature": { "default_digest": "sha256" },
///   "parallel_mrz": true }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VerificationSettings {
    pub(crate) content: ContentSettings,

    pub(crate) signature: SignatureSettings,

    /// Run the MRZ check on its own thread alongside the cryptographic checks.
    pub(crate) parallel_mrz: bool,

    /// Worker threads for batch verification. `None` uses the available parallelism.
    pub(crate) batch_workers: Option<NonZeroUsize>,

    /// Rehash raw data-group content when a record carries it.
    pub(crate) recompute_data_group_hashes: bool,
}

impl Default for VerificationSettings {
    fn default() -> Self {
        Self {
            content: ContentSettings::default(),
            signature: SignatureSettings::default(),
            parallel_mrz: false,
            batch_workers: None,
            recompute_data_group_hashes: true,
        }
    }
}

impl VerificationSettings {
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn with_framing(mut self, framing: ContentFraming) -> Self {
        self.content.framing = framing;
        self
    }

    pub fn with_signature_settings(mut self, signature: SignatureSettings) -> Self {
        self.signature = signature;
        self
    }

    pub fn with_parallel_mrz(mut self, enabled: bool) -> Self {
        self.parallel_mrz = enabled;
        self
    }

    pub fn with_batch_workers(mut self, workers: NonZeroUsize) -> Self {
        self.batch_workers = Some(workers);
        self
    }

    /// Ignore raw data-group content and compare hashes only.
    pub fn without_data_group_recomputation(mut self) -> Self {
        self.recompute_data_group_hashes = false;
        self
    }

    pub fn framing(&self) -> ContentFraming {
        self.content.framing
    }

    pub fn signature(&self) -> &SignatureSettings {
        &self.signature
    }

    pub fn parallel_mrz(&self) -> bool {
        self.parallel_mrz
    }

    pub fn recompute_data_group_hashes(&self) -> bool {
        self.recompute_data_group_hashes
    }

    /// Configured worker count, else the available parallelism (at least 1).
    pub fn batch_workers(&self) -> usize {
        self.batch_workers
            .or_else(|| thread::available_parallelism().ok())
            .map_or(1, NonZeroUsize::get)
    }
}
