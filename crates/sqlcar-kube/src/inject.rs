//! Sidecar injection into a Deployment's pod template

use k8s_openapi::api::core::v1::{
    Container, ResourceRequirements, SecretVolumeSource, SecurityContext, Volume, VolumeMount,
};
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use serde::Serialize;
use sqlcar_core::{CREDENTIALS_SECRET, ResourceList, SidecarSpec};
use std::collections::BTreeMap;

use crate::deployment::{DeploymentManifest, NamedEntry};
use crate::error::{KubeError, Result};

fn resource_list(list: &ResourceList) -> BTreeMap<String, Quantity> {
    BTreeMap::from([
        ("cpu".to_string(), Quantity(list.cpu.to_string())),
        ("memory".to_string(), Quantity(list.memory.to_string())),
    ])
}

/// The Kubernetes container for a sidecar spec
pub fn sidecar_container(spec: &SidecarSpec) -> Container {
    Container {
        name: spec.name.clone(),
        image: Some(spec.image.clone()),
        command: Some(spec.command.clone()),
        resources: Some(ResourceRequirements {
            requests: Some(resource_list(&spec.resources.requests)),
            limits: Some(resource_list(&spec.resources.limits)),
            ..Default::default()
        }),
        security_context: Some(SecurityContext {
            run_as_user: Some(spec.security.run_as_user),
            allow_privilege_escalation: Some(spec.security.allow_privilege_escalation),
            ..Default::default()
        }),
        volume_mounts: Some(vec![VolumeMount {
            name: spec.volume_mount.name.clone(),
            mount_path: spec.volume_mount.mount_path.clone(),
            read_only: Some(spec.volume_mount.read_only),
            ..Default::default()
        }]),
        ..Default::default()
    }
}

/// The Secret-backed volume the sidecar mounts
pub fn credentials_volume(spec: &SidecarSpec) -> Volume {
    Volume {
        name: spec.volume_mount.name.clone(),
        secret: Some(SecretVolumeSource {
            secret_name: Some(CREDENTIALS_SECRET.to_string()),
            ..Default::default()
        }),
        ..Default::default()
    }
}

fn to_entry(value: &impl Serialize) -> Result<NamedEntry> {
    serde_yaml::to_value(value)
        .and_then(serde_yaml::from_value)
        .map_err(|e| KubeError::Encode(e.to_string()))
}

/// Append the sidecar container and its credentials volume
///
/// Existing containers and volumes are left untouched. Fails without
/// modifying anything if either name is already taken.
pub fn inject_sidecar(manifest: &mut DeploymentManifest, spec: &SidecarSpec) -> Result<()> {
    let volume = credentials_volume(spec);

    if manifest.containers().iter().any(|c| c.name == spec.name) {
        return Err(KubeError::NameConflict {
            kind: "container",
            name: spec.name.clone(),
        });
    }
    if manifest.volumes().iter().any(|v| v.name == volume.name) {
        return Err(KubeError::NameConflict {
            kind: "volume",
            name: volume.name,
        });
    }

    let container_entry = to_entry(&sidecar_container(spec))?;
    let volume_entry = to_entry(&volume)?;

    let pod_spec = &mut manifest.spec.template.spec;
    pod_spec.containers.push(container_entry);
    pod_spec.volumes.get_or_insert_with(Vec::new).push(volume_entry);

    tracing::info!(
        deployment = manifest.name().unwrap_or("<unnamed>"),
        container = %spec.name,
        image = %spec.image,
        "injected proxy sidecar"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::ManifestFormat;
    use sqlcar_core::ProxyConfig;

    const DEPLOYMENT: &str = r#"apiVersion: apps/v1
kind: Deployment
metadata:
  name: test
spec:
  template:
    spec:
      containers:
      - name: name-test
        image: some-image
      volumes:
      - name: test-volume
        secret:
          secretName: test-secret
"#;

    fn sidecar() -> SidecarSpec {
        SidecarSpec::build(&ProxyConfig::new("instance-test", "region-test", "project-test"))
            .unwrap()
    }

    fn manifest() -> DeploymentManifest {
        DeploymentManifest::from_yaml(DEPLOYMENT).unwrap()
    }

    #[test]
    fn test_sidecar_container() {
        let container = sidecar_container(&sidecar());

        assert_eq!(container.name, "cloudsql-proxy");
        assert_eq!(
            container.image.as_deref(),
            Some("gcr.io/cloudsql-docker/gce-proxy:1.11")
        );
        let resources = container.resources.unwrap();
        assert_eq!(resources.requests.unwrap()["cpu"], Quantity("5m".to_string()));
        assert_eq!(resources.limits.unwrap()["memory"], Quantity("128Mi".to_string()));

        let security = container.security_context.unwrap();
        assert_eq!(security.run_as_user, Some(2));
        assert_eq!(security.allow_privilege_escalation, Some(false));

        let mounts = container.volume_mounts.unwrap();
        assert_eq!(mounts.len(), 1);
        assert_eq!(mounts[0].mount_path, "/secrets/cloudsql");
        assert_eq!(mounts[0].read_only, Some(true));
    }

    #[test]
    fn test_inject_appends_one_container_and_volume() {
        let mut manifest = manifest();
        let before = manifest.clone();

        inject_sidecar(&mut manifest, &sidecar()).unwrap();

        let containers = manifest.containers();
        assert_eq!(containers.len(), 2);
        assert_eq!(containers[0], before.containers()[0]);
        assert_eq!(containers[1].name, "cloudsql-proxy");

        let volumes = manifest.volumes();
        assert_eq!(volumes.len(), 2);
        assert_eq!(volumes[0], before.volumes()[0]);
        assert_eq!(volumes[1].name, "cloudsql-proxy-credentials");
    }

    #[test]
    fn test_inject_encodes_sidecar_fields() {
        let mut manifest = manifest();
        inject_sidecar(&mut manifest, &sidecar()).unwrap();

        let encoded = manifest.encode(ManifestFormat::Yaml).unwrap();
        let value: serde_yaml::Value = serde_yaml::from_str(&encoded).unwrap();
        let pod = &value["spec"]["template"]["spec"];

        let proxy = &pod["containers"][1];
        assert_eq!(proxy["command"][1], "-instances=project-test:region-test:instance-test");
        assert_eq!(proxy["resources"]["requests"]["memory"], "8Mi");
        assert_eq!(proxy["securityContext"]["runAsUser"], 2);
        assert_eq!(proxy["volumeMounts"][0]["name"], "cloudsql-proxy-credentials");
        assert_eq!(
            pod["volumes"][1]["secret"]["secretName"],
            "cloudsql-proxy-credentials"
        );
    }

    #[test]
    fn test_inject_creates_volume_list() {
        let input = "apiVersion: apps/v1\nkind: Deployment\nmetadata:\n  name: x\nspec:\n  template:\n    spec:\n      containers:\n      - name: app\n";
        let mut manifest = DeploymentManifest::from_yaml(input).unwrap();
        inject_sidecar(&mut manifest, &sidecar()).unwrap();
        assert_eq!(manifest.volumes().len(), 1);
    }

    #[test]
    fn test_inject_twice_is_a_conflict() {
        let mut manifest = manifest();
        inject_sidecar(&mut manifest, &sidecar()).unwrap();
        let snapshot = manifest.clone();

        let err = inject_sidecar(&mut manifest, &sidecar()).unwrap_err();
        insta::assert_snapshot!(err.to_string(), @"pod template already has a container named 'cloudsql-proxy'");
        assert_eq!(manifest, snapshot);
    }

    #[test]
    fn test_inject_volume_conflict() {
        let input = DEPLOYMENT.replace("test-volume", "cloudsql-proxy-credentials");
        let mut manifest = DeploymentManifest::from_yaml(&input).unwrap();

        let err = inject_sidecar(&mut manifest, &sidecar()).unwrap_err();
        assert!(matches!(err, KubeError::NameConflict { kind: "volume", .. }));
        assert_eq!(manifest.containers().len(), 1);
    }
}
