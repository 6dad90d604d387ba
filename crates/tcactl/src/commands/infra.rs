//! vim, cluster, pool and template commands

use super::{read_spec, Context};
use crate::cli::{ClusterCommand, PoolCommand, TemplateCommand, VimCommand};
use crate::output::{render_list, render_one};
use tca_client::models::*;
use tca_client::{ClusterOrchestrator, TcaClientTrait, VimRegistry};

pub async fn vim<C: TcaClientTrait + ?Sized>(ctx: &Context<'_, C>, cmd: VimCommand) -> anyhow::Result<String> {
    let registry = VimRegistry::new(ctx.client);
    match cmd {
        VimCommand::List => render_list(&registry.list_vims(&ctx.cancel).await?, ctx.output),
        VimCommand::Get { name } => render_one(&registry.get_vim(&name, &ctx.cancel).await?, ctx.output),
        VimCommand::Register { file } => {
            let spec: CloudProviderSpec = read_spec(&file)?;
            render_one(&registry.register_vim(&spec, &ctx.cancel).await?, ctx.output)
        }
        VimCommand::Delete { name } => render_one(&registry.delete_vim(&name, &ctx.cancel).await?, ctx.output),
    }
}

pub async fn cluster<C: TcaClientTrait + ?Sized>(ctx: &Context<'_, C>, cmd: ClusterCommand) -> anyhow::Result<String> {
    let orchestrator = ClusterOrchestrator::new(ctx.client);
    let cancel = &ctx.cancel;
    match cmd {
        ClusterCommand::List => render_list(&orchestrator.list_clusters(cancel).await?, ctx.output),
        ClusterCommand::Get { name } => render_one(&orchestrator.get_cluster(&name, cancel).await?, ctx.output),
        ClusterCommand::Create { file, wait } => {
            let spec: ClusterSpec = read_spec(&file)?;
            let handle = orchestrator.create_cluster(spec, cancel).await?;
            ctx.finish_task(handle, &wait).await
        }
        ClusterCommand::Delete { name, wait } => {
            let handle = orchestrator.delete_cluster(&name, cancel).await?;
            ctx.finish_task(handle, &wait).await
        }
        ClusterCommand::Kubeconfig { name } => Ok(orchestrator.get_kubeconfig(&name, cancel).await?),
        ClusterCommand::Password { name, existing, new } => {
            let handle = orchestrator
                .change_cluster_password(&name, &existing, &new, cancel)
                .await?;
            render_one(&handle, ctx.output)
        }
        ClusterCommand::Tasks { name } => render_list(&orchestrator.list_tasks(&name, cancel).await?, ctx.output),
        ClusterCommand::Retry { task, wait } => {
            let handle = orchestrator.retry_task(&task, cancel).await?;
            ctx.finish_task(handle, &wait).await
        }
        ClusterCommand::Abort { task } => render_one(&orchestrator.abort_task(&task, cancel).await?, ctx.output),
    }
}

pub async fn pool<C: TcaClientTrait + ?Sized>(ctx: &Context<'_, C>, cmd: PoolCommand) -> anyhow::Result<String> {
    let orchestrator = ClusterOrchestrator::new(ctx.client);
    let cancel = &ctx.cancel;
    match cmd {
        PoolCommand::List { cluster } => {
            render_list(&orchestrator.list_node_pools(&cluster, cancel).await?, ctx.output)
        }
        PoolCommand::Get { cluster, name } => {
            render_one(&orchestrator.get_node_pool(&cluster, &name, cancel).await?, ctx.output)
        }
        PoolCommand::Create {
            cluster,
            file,
            dry_run,
            wait,
        } => {
            let spec: NodePoolSpec = read_spec(&file)?;
            let name = spec.name.clone();
            let handle = orchestrator
                .create_node_pool(&cluster, spec, dry_run, cancel)
                .await?;
            if dry_run {
                return Ok(format!("node pool {} is valid for cluster {}", name, cluster));
            }
            ctx.finish_task(handle, &wait).await
        }
        PoolCommand::Update {
            cluster,
            name,
            file,
            wait,
        } => {
            let spec: NodePoolSpec = read_spec(&file)?;
            let handle = orchestrator
                .update_node_pool(&cluster, &name, spec, cancel)
                .await?;
            ctx.finish_task(handle, &wait).await
        }
        PoolCommand::Delete { cluster, name, wait } => {
            let handle = orchestrator.delete_node_pool(&cluster, &name, cancel).await?;
            ctx.finish_task(handle, &wait).await
        }
    }
}

pub async fn template<C: TcaClientTrait + ?Sized>(ctx: &Context<'_, C>, cmd: TemplateCommand) -> anyhow::Result<String> {
    let orchestrator = ClusterOrchestrator::new(ctx.client);
    let cancel = &ctx.cancel;
    match cmd {
        TemplateCommand::List => render_list(&orchestrator.list_templates(cancel).await?, ctx.output),
        TemplateCommand::Get { name } => render_one(&orchestrator.get_template(&name, cancel).await?, ctx.output),
        TemplateCommand::Create { file } => {
            let template: ClusterTemplate = read_spec(&file)?;
            render_one(&orchestrator.create_template(&template, cancel).await?, ctx.output)
        }
        TemplateCommand::Update { name, file } => {
            let template: ClusterTemplate = read_spec(&file)?;
            render_one(&orchestrator.update_template(&name, &template, cancel).await?, ctx.output)
        }
        TemplateCommand::Delete { name } => {
            render_one(&orchestrator.delete_template(&name, cancel).await?, ctx.output)
        }
    }
}
