//! CNF instance commands

use super::{read_spec, Context};
use crate::cli::{InstanceCommand, WaitArgs};
use crate::output::{render_list, render_one};
use tca_client::models::*;
use tca_client::{LcmEngine, TcaClientTrait};

const INSTANTIATED: &str = "INSTANTIATED";
const NOT_INSTANTIATED: &str = "NOT_INSTANTIATED";

/// Render the instance once it reaches `target`, or right away without `--wait`
async fn finish<C: TcaClientTrait + ?Sized>(
    ctx: &Context<'_, C>,
    instance_id: &str,
    target: &str,
    wait: &WaitArgs,
) -> anyhow::Result<String> {
    let info = if wait.wait {
        ctx.waiter()
            .wait_instance_state(instance_id, target, wait.max_attempts, true, &ctx.cancel)
            .await?
    } else {
        LcmEngine::new(ctx.client).get_instance(instance_id, &ctx.cancel).await?
    };
    render_one(&info, ctx.output)
}

pub async fn instance<C: TcaClientTrait + ?Sized>(ctx: &Context<'_, C>, cmd: InstanceCommand) -> anyhow::Result<String> {
    let engine = LcmEngine::new(ctx.client);
    let cancel = &ctx.cancel;
    match cmd {
        InstanceCommand::List { extended } => {
            let instances = if extended {
                engine.list_instances_extended(cancel).await?
            } else {
                engine.list_instances(cancel).await?
            };
            render_list(&instances, ctx.output)
        }
        InstanceCommand::Get { name } => render_one(&engine.get_instance(&name, cancel).await?, ctx.output),
        InstanceCommand::Create {
            file,
            no_instantiate,
            wait,
        } => {
            let spec: InstanceSpec = read_spec(&file)?;
            if no_instantiate {
                let plan = engine.prepare(&spec, cancel).await?;
                return render_one(&engine.create(&plan, cancel).await?, ctx.output);
            }
            let (created, _) = engine.create_and_instantiate(&spec, cancel).await?;
            finish(ctx, &created.id, INSTANTIATED, &wait).await
        }
        InstanceCommand::Instantiate { name, file, wait } => {
            let spec: InstanceSpec = read_spec(&file)?;
            let info = engine.get_instance(&name, cancel).await?;
            let request = engine.build_instantiate_request(&spec, cancel).await?;
            engine.instantiate(&info.id, &request, cancel).await?;
            finish(ctx, &info.id, INSTANTIATED, &wait).await
        }
        InstanceCommand::Terminate {
            name,
            force,
            timeout,
            wait,
        } => {
            let info = engine.get_instance(&name, cancel).await?;
            let request = TerminateVnfRequest {
                termination_type: if force {
                    TerminationType::Forceful
                } else {
                    TerminationType::Graceful
                },
                graceful_termination_timeout: timeout,
                additional_params: None,
            };
            engine.terminate(&info.id, &request, cancel).await?;
            finish(ctx, &info.id, NOT_INSTANTIATED, &wait).await
        }
        InstanceCommand::Rollback { name, wait } => {
            let info = engine.get_instance(&name, cancel).await?;
            engine.rollback(&info.id, cancel).await?;
            finish(ctx, &info.id, NOT_INSTANTIATED, &wait).await
        }
        InstanceCommand::Reset { name } => {
            let info = engine.get_instance(&name, cancel).await?;
            engine.reset(&info.id, cancel).await?;
            render_one(&engine.get_instance(&info.id, cancel).await?, ctx.output)
        }
        InstanceCommand::Reconfigure { name, file } => {
            let params: serde_json::Value = read_spec(&file)?;
            let info = engine.get_instance(&name, cancel).await?;
            engine.reconfigure(&info.id, &params, cancel).await?;
            render_one(&engine.get_instance(&info.id, cancel).await?, ctx.output)
        }
        InstanceCommand::Retry { name } => {
            let info = engine.get_instance(&name, cancel).await?;
            engine.retry(&info.id, cancel).await?;
            render_one(&engine.get_instance(&info.id, cancel).await?, ctx.output)
        }
        InstanceCommand::Delete { name } => render_one(&engine.delete(&name, cancel).await?, ctx.output),
    }
}
