//! catalog, extension and repo commands

use super::{read_spec, Context};
use crate::cli::{CatalogCommand, ExtensionCommand, RepoCommand};
use crate::output::{render_list, render_one, render_value};
use tca_client::models::ExtensionSpec;
use tca_client::{CatalogRegistry, TcaClientTrait};

pub async fn catalog<C: TcaClientTrait + ?Sized>(ctx: &Context<'_, C>, cmd: CatalogCommand) -> anyhow::Result<String> {
    let registry = CatalogRegistry::new(ctx.client);
    match cmd {
        CatalogCommand::List => render_list(&registry.list_catalog(&ctx.cancel).await?, ctx.output),
        CatalogCommand::Get { name } => render_one(&registry.get_catalog(&name, &ctx.cancel).await?, ctx.output),
        CatalogCommand::Vdus { name } => {
            render_list(&registry.get_vdu_by_catalog_name(&name, &ctx.cancel).await?, ctx.output)
        }
    }
}

pub async fn extension<C: TcaClientTrait + ?Sized>(ctx: &Context<'_, C>, cmd: ExtensionCommand) -> anyhow::Result<String> {
    let registry = CatalogRegistry::new(ctx.client);
    match cmd {
        ExtensionCommand::List => render_list(&registry.list_extensions(&ctx.cancel).await?, ctx.output),
        ExtensionCommand::Get { name } => {
            render_one(&registry.get_extension(&name, &ctx.cancel).await?, ctx.output)
        }
        ExtensionCommand::Register { file } => {
            let spec: ExtensionSpec = read_spec(&file)?;
            render_value(&registry.register_extension(&spec, &ctx.cancel).await?, ctx.output)
        }
        ExtensionCommand::Delete { name } => {
            render_one(&registry.delete_extension(&name, &ctx.cancel).await?, ctx.output)
        }
    }
}

pub async fn repo<C: TcaClientTrait + ?Sized>(ctx: &Context<'_, C>, cmd: RepoCommand) -> anyhow::Result<String> {
    let registry = CatalogRegistry::new(ctx.client);
    match cmd {
        RepoCommand::List { vim } => render_list(&registry.list_repositories(&vim, &ctx.cancel).await?, ctx.output),
    }
}
