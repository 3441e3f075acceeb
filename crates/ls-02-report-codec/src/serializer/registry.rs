//! Serializer registry.

use super::{ReportSerializer, ReportSerializerV1};
use crate::domain::ReportVersion;
use crate::error::{CodecError, CodecResult};
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

/// Maps each report version to the serializer that owns it.
#[derive(Debug, Default)]
pub struct SerializerRegistry {
    serializers: RwLock<BTreeMap<ReportVersion, Arc<dyn ReportSerializer>>>,
}

impl SerializerRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in version.
    pub fn with_defaults() -> Self {
        let mut serializers: BTreeMap<ReportVersion, Arc<dyn ReportSerializer>> = BTreeMap::new();
        serializers.insert(ReportVersion::V1, Arc::new(ReportSerializerV1));
        Self {
            serializers: RwLock::new(serializers),
        }
    }

    pub fn register(&self, serializer: Arc<dyn ReportSerializer>) -> CodecResult<()> {
        let version = serializer.version();
        let mut serializers = self.serializers.write();
        if serializers.contains_key(&version) {
            return Err(CodecError::DuplicateSerializerVersion {
                version: version.as_number(),
            });
        }
        serializers.insert(version, serializer);
        debug!(%version, "Report serializer registered");
        Ok(())
    }

    pub fn unregister(&self, version: ReportVersion) -> Option<Arc<dyn ReportSerializer>> {
        self.serializers.write().remove(&version)
    }

    pub fn get(&self, version: ReportVersion) -> CodecResult<Arc<dyn ReportSerializer>> {
        self.serializers
            .read()
            .get(&version)
            .cloned()
            .ok_or(CodecError::InvalidSerializerVersion {
                version: version.as_number(),
            })
    }

    /// Registered versions, ascending.
    pub fn supported_versions(&self) -> Vec<ReportVersion> {
        self.serializers.read().keys().copied().collect()
    }
}
