//! spec validate

use super::Context;
use anyhow::{bail, Context as _};
use std::path::Path;
use tca_client::spec::AnySpec;
use tca_client::{ClusterOrchestrator, SpecValidator, StructuralValidation, TcaClientTrait};

fn read(file: &Path) -> anyhow::Result<AnySpec> {
    let spec = AnySpec::read_file(file).with_context(|| format!("reading {}", file.display()))?;
    spec.check_structure()?;
    Ok(spec)
}

/// Structural checks only
pub fn validate_offline(file: &Path) -> anyhow::Result<String> {
    let spec = read(file)?;
    Ok(format!("{} spec {} is well formed", spec.kind(), file.display()))
}

/// Structural checks, then every reference resolved against the server
pub async fn validate<C: TcaClientTrait + ?Sized>(
    ctx: &Context<'_, C>,
    file: &Path,
    cluster: Option<&str>,
) -> anyhow::Result<String> {
    let spec = read(file)?;
    let validator = SpecValidator::new(ctx.client);
    let cancel = &ctx.cancel;
    match spec {
        AnySpec::Cluster(mut cluster_spec) => {
            let vim = validator.validate_cluster(&mut cluster_spec, cancel).await?;
            Ok(format!("cluster {} is valid on vim {}", cluster_spec.name, vim.display_name()))
        }
        AnySpec::NodePool(mut pool) => {
            let Some(cluster) = cluster else {
                bail!("node pool specs need --cluster");
            };
            let target = ClusterOrchestrator::new(ctx.client).get_cluster(cluster, cancel).await?;
            validator.validate_node_pool(&target, &mut pool, cancel).await?;
            Ok(format!("node pool {} is valid for cluster {}", pool.name, target.cluster_name))
        }
        AnySpec::Instance(instance) => {
            let resolved = validator.validate_instance(&instance, cancel).await?;
            Ok(format!(
                "instance {} is valid: catalog {}, pool {}/{}, repository {}",
                instance.instance_name,
                resolved.package.catalog_name(),
                resolved.cluster.cluster_name,
                resolved.pool.name,
                resolved.repository.name
            ))
        }
        AnySpec::Extension(extension) => {
            let vims = validator.validate_extension(&extension, cancel).await?;
            Ok(format!("extension {} is valid for {} vim(s)", extension.name, vims.len()))
        }
        AnySpec::Provider(provider) => {
            validator.validate_provider(&provider)?;
            Ok(format!("provider {} is valid", provider.vim_name))
        }
        AnySpec::Template(template) => Ok(format!("cluster template {} is well formed", template.name)),
    }
}
