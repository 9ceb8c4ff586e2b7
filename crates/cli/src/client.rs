//! Kubernetes client construction

use anyhow::{Context, Result};
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Client, Config};
use std::path::Path;
use tracing::debug;

const EXEC_API_VERSION_HINT: &str = "the kubeconfig exec plugin reports an unsupported \
apiVersion; update the credential plugin or change `client.authentication.k8s.io/v1alpha1` \
to `client.authentication.k8s.io/v1beta1` in the kubeconfig";

/// Build a client from an explicit kubeconfig and/or context, falling back
/// to the usual inference (`KUBECONFIG`, `~/.kube/config`, in-cluster)
pub async fn connect(kubeconfig: Option<&Path>, context: Option<&str>) -> Result<Client> {
    let options = KubeConfigOptions {
        context: context.map(str::to_string),
        ..Default::default()
    };

    let config = match kubeconfig {
        Some(path) => {
            let raw = Kubeconfig::read_from(path)
                .with_context(|| format!("Failed to read kubeconfig {}", path.display()))?;
            Config::from_custom_kubeconfig(raw, &options)
                .await
                .map_err(anyhow::Error::from)
        }
        None if context.is_some() => Config::from_kubeconfig(&options)
            .await
            .map_err(anyhow::Error::from),
        None => Config::infer().await.map_err(anyhow::Error::from),
    }
    .map_err(with_hint)?;

    debug!(cluster_url = %config.cluster_url, namespace = %config.default_namespace, "Loaded kubeconfig");
    Client::try_from(config).context("Failed to create Kubernetes client")
}

fn with_hint(err: anyhow::Error) -> anyhow::Error {
    let exec_version = format!("{err:#}").contains("apiVersion");
    let err = err.context("Failed to load Kubernetes configuration");
    if exec_version {
        err.context(EXEC_API_VERSION_HINT)
    } else {
        err
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exec_api_version_hint() {
        let err = with_hint(anyhow::anyhow!("exec plugin: invalid apiVersion \"v1alpha1\""));
        assert!(format!("{err:#}").contains("client.authentication.k8s.io/v1beta1"));

        let err = with_hint(anyhow::anyhow!("no such file"));
        assert!(!format!("{err:#}").contains("v1beta1"));
        assert!(err.to_string().contains("Failed to load Kubernetes configuration"));
    }

    #[tokio::test]
    async fn test_missing_kubeconfig_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("absent");
        let err = connect(Some(&path), None)
            .await
            .err()
            .expect("missing kubeconfig should fail");
        assert!(err.to_string().contains("Failed to read kubeconfig"));
    }
}
