//! Output rendering: aligned tables, JSON or YAML

use clap::ValueEnum;
use serde::Serialize;
use tca_client::models::*;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Columnar table (default)
    #[default]
    Table,
    Json,
    Yaml,
}

/// A record that can be shown as one table row
pub trait Tabular {
    const HEADERS: &'static [&'static str];

    fn row(&self) -> Vec<String>;
}

/// Column-aligned table, header line first
pub fn table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate().take(widths.len()) {
            widths[i] = widths[i].max(cell.len());
        }
    }

    let line = |cells: Vec<&str>| {
        cells
            .iter()
            .enumerate()
            .map(|(i, cell)| format!("{:<width$}", cell, width = widths.get(i).copied().unwrap_or(0)))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut lines = vec![line(headers.to_vec())];
    lines.extend(rows.iter().map(|r| line(r.iter().map(String::as_str).collect())));
    lines.join("\n")
}

fn structured<T: Serialize + ?Sized>(value: &T, format: OutputFormat) -> anyhow::Result<String> {
    Ok(match format {
        OutputFormat::Json => serde_json::to_string_pretty(value)?,
        OutputFormat::Yaml | OutputFormat::Table => serde_yaml::to_string(value)?.trim_end().to_string(),
    })
}

pub fn render_list<T: Serialize + Tabular>(items: &[T], format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Table => Ok(table(T::HEADERS, &items.iter().map(Tabular::row).collect::<Vec<_>>())),
        _ => structured(items, format),
    }
}

pub fn render_one<T: Serialize + Tabular>(item: &T, format: OutputFormat) -> anyhow::Result<String> {
    render_list(std::slice::from_ref(item), format)
}

/// Records without a table shape render as YAML in table mode
pub fn render_value<T: Serialize + ?Sized>(value: &T, format: OutputFormat) -> anyhow::Result<String> {
    structured(value, format)
}

fn or_dash(value: Option<&str>) -> String {
    value.filter(|v| !v.is_empty()).unwrap_or("-").to_string()
}

impl Tabular for VimTenant {
    const HEADERS: &'static [&'static str] = &["NAME", "TYPE", "VIM ID", "TENANT ID", "URL"];

    fn row(&self) -> Vec<String> {
        vec![
            self.display_name().to_string(),
            self.vim_type.to_string(),
            self.vim_id.clone(),
            self.tenant_id.clone(),
            self.vim_url.clone(),
        ]
    }
}

impl Tabular for Cluster {
    const HEADERS: &'static [&'static str] = &["NAME", "TYPE", "STATUS", "ENDPOINT", "ID"];

    fn row(&self) -> Vec<String> {
        vec![
            self.cluster_name.clone(),
            self.cluster_type.map_or_else(|| "-".to_string(), |t| t.to_string()),
            self.status.clone(),
            self.endpoint_ip.clone(),
            self.id.clone(),
        ]
    }
}

impl Tabular for NodePool {
    const HEADERS: &'static [&'static str] = &["NAME", "STATUS", "REPLICAS", "CPU", "MEMORY", "ID"];

    fn row(&self) -> Vec<String> {
        vec![
            self.name.clone(),
            self.status.clone(),
            self.replica.to_string(),
            self.cpu.to_string(),
            self.memory.to_string(),
            self.id.clone(),
        ]
    }
}

impl Tabular for ClusterTemplate {
    const HEADERS: &'static [&'static str] = &["NAME", "TYPE", "POOLS", "ID"];

    fn row(&self) -> Vec<String> {
        vec![
            self.name.clone(),
            self.cluster_type.map_or_else(|| "-".to_string(), |t| t.to_string()),
            self.pool_names().collect::<Vec<_>>().join(","),
            self.id().to_string(),
        ]
    }
}

impl Tabular for VnfPackage {
    const HEADERS: &'static [&'static str] = &["NAME", "PRODUCT", "VERSION", "STATE", "ID"];

    fn row(&self) -> Vec<String> {
        vec![
            self.catalog_name().to_string(),
            self.vnf_product_name.clone(),
            self.vnf_software_version.clone(),
            self.onboarding_state.clone(),
            self.id.clone(),
        ]
    }
}

impl Tabular for Vdu {
    const HEADERS: &'static [&'static str] = &["NAME", "FLAVOUR", "CHART", "VERSION"];

    fn row(&self) -> Vec<String> {
        vec![
            self.name.clone(),
            or_dash(self.flavour()),
            or_dash(self.chart_name.as_deref()),
            or_dash(self.chart_version.as_deref()),
        ]
    }
}

impl Tabular for Extension {
    const HEADERS: &'static [&'static str] = &["NAME", "TYPE", "STATE", "URL", "ID"];

    fn row(&self) -> Vec<String> {
        vec![
            self.name.clone(),
            format!("{:?}/{}", self.extension_type, self.extension_subtype),
            self.state.clone(),
            self.interface_info.url.clone(),
            self.extension_id.clone(),
        ]
    }
}

impl Tabular for Repository {
    const HEADERS: &'static [&'static str] = &["NAME", "TYPE", "STATE", "URL", "ID"];

    fn row(&self) -> Vec<String> {
        vec![
            self.name.clone(),
            self.repo_type.clone(),
            self.state.clone(),
            self.url.clone(),
            self.id.clone(),
        ]
    }
}

impl Tabular for LcmInfo {
    const HEADERS: &'static [&'static str] = &["NAME", "STATE", "LAST OPERATION", "CATALOG", "ALLOWED", "ID"];

    fn row(&self) -> Vec<String> {
        let last = match self.operation_state() {
            Some(state) => format!("{} {:?}", self.lcm_operation(), state),
            None => "-".to_string(),
        };
        vec![
            self.vnf_instance_name.clone(),
            self.instantiation_state.clone(),
            last,
            or_dash(self.catalog_name()),
            self.links
                .allowed()
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(","),
            self.id.clone(),
        ]
    }
}

impl Tabular for ClusterTask {
    const HEADERS: &'static [&'static str] = &["TASK", "TYPE", "STATUS", "PROGRESS", "MESSAGE"];

    fn row(&self) -> Vec<String> {
        vec![
            self.task_id.clone(),
            self.task_type.clone(),
            self.status.to_string(),
            format!("{}%", self.progress),
            or_dash(self.message.as_deref()),
        ]
    }
}

impl Tabular for TaskHandle {
    const HEADERS: &'static [&'static str] = &["TASK", "OPERATION", "ENTITY"];

    fn row(&self) -> Vec<String> {
        vec![
            or_dash(Some(self.id.as_str())),
            or_dash(self.operation_id.as_deref()),
            or_dash(self.entity_id.as_deref()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_aligns_columns() {
        let rows = vec![
            vec!["edge-test01".to_string(), "ACTIVE".to_string()],
            vec!["m1".to_string(), "-".to_string()],
        ];
        let out = table(&["NAME", "STATUS"], &rows);
        assert_eq!(out, "NAME         STATUS\nedge-test01  ACTIVE\nm1           -");
    }

    #[test]
    fn test_render_formats() {
        let handle = TaskHandle {
            id: "T1".to_string(),
            operation_id: None,
            entity_id: Some("c1".to_string()),
        };

        let text = render_one(&handle, OutputFormat::Table).unwrap();
        assert_eq!(text.lines().nth(1), Some("T1    -          c1"));

        let json: serde_json::Value =
            serde_json::from_str(&render_one(&handle, OutputFormat::Json).unwrap()).unwrap();
        assert_eq!(json[0]["entityId"], "c1");

        let yaml = render_value(&handle, OutputFormat::Yaml).unwrap();
        assert!(yaml.contains("entityId: c1"));
    }

    #[test]
    fn test_instance_row_lists_allowed_operations() {
        let info = LcmInfo {
            vnf_instance_name: "app-1".to_string(),
            instantiation_state: "INSTANTIATED".to_string(),
            links: PolicyLinks(
                [("terminate", "/t"), ("heal", "/h")]
                    .into_iter()
                    .map(|(k, h)| (k.to_string(), Link { href: h.to_string() }))
                    .collect(),
            ),
            ..Default::default()
        };
        assert_eq!(info.row()[4], "terminate,heal");
    }
}
