//! Command dispatch
//!
//! Every command renders its result to a string; `main` prints it. Commands are
//! generic over the client trait so they run unchanged against the mock.

mod catalog;
mod infra;
mod instance;
mod spec;

use crate::cli::{Cli, Command, SpecCommand, WaitArgs};
use crate::config::Settings;
use crate::output::{render_list, render_one, OutputFormat};
use anyhow::Context as _;
use serde::de::DeserializeOwned;
use std::path::Path;
use tca_client::{
    CancellationToken, TaskHandle, TaskStatus, TaskWaiter, TcaClient, TcaClientTrait,
};
use tracing::info;

pub struct Context<'a, C: ?Sized> {
    pub client: &'a C,
    pub output: OutputFormat,
    pub cancel: CancellationToken,
}

impl<'a, C: TcaClientTrait + ?Sized> Context<'a, C> {
    pub fn new(client: &'a C, output: OutputFormat) -> Self {
        Self {
            client,
            output,
            cancel: CancellationToken::new(),
        }
    }

    fn waiter(&self) -> TaskWaiter<'a, C> {
        TaskWaiter::new(self.client)
    }

    /// Render `handle`, or the finished task tree when `--wait` was given
    async fn finish_task(&self, handle: TaskHandle, wait: &WaitArgs) -> anyhow::Result<String> {
        if !wait.wait || handle.is_empty() {
            return render_one(&handle, self.output);
        }
        info!("Waiting for task {}", handle.operation_id.as_deref().unwrap_or(&handle.id));
        let tasks = self
            .waiter()
            .wait_task_tree(&handle, TaskStatus::Success, wait.max_attempts, true, &self.cancel)
            .await?;
        render_list(&tasks, self.output)
    }
}

/// Read a JSON or YAML document, naming the file on failure
fn read_spec<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    tca_client::spec::read_spec_file(path).with_context(|| format!("reading {}", path.display()))
}

/// Connect, authenticate and run one command
pub async fn run(cli: Cli) -> anyhow::Result<String> {
    if let Command::Spec(SpecCommand::Validate {
        file,
        offline: true,
        ..
    }) = &cli.command
    {
        return spec::validate_offline(file);
    }

    let settings = Settings::resolve(&cli.connection, |key| std::env::var(key).ok())?;
    let client = TcaClient::new(settings.client_config()).context("building TCA client")?;
    if cli.trace {
        client.transport().set_trace_sink(Box::new(std::io::stderr()));
        client.transport().set_trace(true);
    }

    let ctx = Context::new(&client, cli.output);
    let interrupt = ctx.cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            interrupt.cancel();
        }
    });

    client
        .authenticate(&ctx.cancel)
        .await
        .with_context(|| format!("authenticating to {}", settings.url))?;
    execute(&ctx, cli.command).await
}

pub async fn execute<C: TcaClientTrait + ?Sized>(ctx: &Context<'_, C>, command: Command) -> anyhow::Result<String> {
    match command {
        Command::Vim(cmd) => infra::vim(ctx, cmd).await,
        Command::Cluster(cmd) => infra::cluster(ctx, cmd).await,
        Command::Pool(cmd) => infra::pool(ctx, cmd).await,
        Command::Template(cmd) => infra::template(ctx, cmd).await,
        Command::Catalog(cmd) => catalog::catalog(ctx, cmd).await,
        Command::Extension(cmd) => catalog::extension(ctx, cmd).await,
        Command::Repo(cmd) => catalog::repo(ctx, cmd).await,
        Command::Instance(cmd) => instance::instance(ctx, cmd).await,
        Command::Spec(SpecCommand::Validate { file, cluster, .. }) => {
            spec::validate(ctx, &file, cluster.as_deref()).await
        }
    }
}
