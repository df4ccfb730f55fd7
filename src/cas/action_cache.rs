use std::sync::Arc;

#[cfg(test)]
use mockall::automock;
use tonic::async_trait;
use tonic::codec::ProstCodec;
use tonic::codegen::http::uri::PathAndQuery;
use tonic::transport::Channel;
use tracing::debug;

use super::ContentAddressableStorage;
use super::DelegateCasMap;
use crate::config::ActionCacheConfig;
use crate::digest::ActionKey;
use crate::digest::DigestUtil;
use crate::proto::ActionResult;
use crate::proto::GetActionResultRequest;
use crate::proto::UpdateActionResultRequest;
use crate::NetworkError;
use crate::Result;

#[cfg_attr(test, automock)]
#[async_trait]
pub trait ActionCache: Send + Sync + 'static {
    async fn get(
        &self,
        key: &ActionKey,
    ) -> Result<Option<ActionResult>>;

    async fn put(
        &self,
        key: &ActionKey,
        result: ActionResult,
    ) -> Result<()>;
}

/// Builds the action cache binding selected by the configuration.
pub fn create_action_cache(
    config: &ActionCacheConfig,
    cas: Arc<dyn ContentAddressableStorage>,
    digest_util: DigestUtil,
) -> Result<Arc<dyn ActionCache>> {
    match config {
        ActionCacheConfig::DelegateCas => {
            Ok(Arc::new(DelegateCasActionCache::new(cas, digest_util)))
        }
        ActionCacheConfig::Grpc {
            target,
            instance_name,
        } => Ok(Arc::new(GrpcActionCache::new(
            target.clone(),
            instance_name.clone(),
        )?)),
    }
}

/// In-process binding: results are stored through the CAS via a
/// [`DelegateCasMap`].
pub struct DelegateCasActionCache {
    map: DelegateCasMap<ActionKey, ActionResult>,
}

impl DelegateCasActionCache {
    pub fn new(
        cas: Arc<dyn ContentAddressableStorage>,
        digest_util: DigestUtil,
    ) -> Self {
        Self {
            map: DelegateCasMap::new(cas, digest_util),
        }
    }
}

#[async_trait]
impl ActionCache for DelegateCasActionCache {
    async fn get(
        &self,
        key: &ActionKey,
    ) -> Result<Option<ActionResult>> {
        self.map.get(key).await
    }

    async fn put(
        &self,
        key: &ActionKey,
        result: ActionResult,
    ) -> Result<()> {
        self.map.put(key.clone(), result).await
    }
}

const GET_ACTION_RESULT_PATH: &str =
    "/build.bazel.remote.execution.v2.ActionCache/GetActionResult";
const UPDATE_ACTION_RESULT_PATH: &str =
    "/build.bazel.remote.execution.v2.ActionCache/UpdateActionResult";

/// Remote binding speaking the `ActionCache` service over a lazily
/// connected channel.
pub struct GrpcActionCache {
    instance_name: String,
    grpc: tonic::client::Grpc<Channel>,
}

impl GrpcActionCache {
    pub fn new(
        target: String,
        instance_name: String,
    ) -> Result<Self> {
        let channel = Channel::from_shared(target.clone())
            .map_err(|_| NetworkError::InvalidUri(target))?
            .connect_lazy();
        Ok(Self {
            instance_name,
            grpc: tonic::client::Grpc::new(channel),
        })
    }
}

#[async_trait]
impl ActionCache for GrpcActionCache {
    async fn get(
        &self,
        key: &ActionKey,
    ) -> Result<Option<ActionResult>> {
        let mut grpc = self.grpc.clone();
        grpc.ready()
            .await
            .map_err(|e| NetworkError::ServiceUnavailable(e.to_string()))?;

        let codec: ProstCodec<GetActionResultRequest, ActionResult> = ProstCodec::default();
        let request = tonic::Request::new(GetActionResultRequest {
            instance_name: self.instance_name.clone(),
            action_digest: Some(key.digest().clone()),
        });
        match grpc
            .unary(request, PathAndQuery::from_static(GET_ACTION_RESULT_PATH), codec)
            .await
        {
            Ok(response) => Ok(Some(response.into_inner())),
            Err(status) if status.code() == tonic::Code::NotFound => {
                debug!(hash = %key.digest().hash, "remote cache miss");
                Ok(None)
            }
            Err(status) => Err(status.into()),
        }
    }

    async fn put(
        &self,
        key: &ActionKey,
        result: ActionResult,
    ) -> Result<()> {
        let mut grpc = self.grpc.clone();
        grpc.ready()
            .await
            .map_err(|e| NetworkError::ServiceUnavailable(e.to_string()))?;

        let codec: ProstCodec<UpdateActionResultRequest, ActionResult> = ProstCodec::default();
        let request = tonic::Request::new(UpdateActionResultRequest {
            instance_name: self.instance_name.clone(),
            action_digest: Some(key.digest().clone()),
            action_result: Some(result),
        });
        grpc.unary(
            request,
            PathAndQuery::from_static(UPDATE_ACTION_RESULT_PATH),
            codec,
        )
        .await?;
        Ok(())
    }
}
