use std::path::PathBuf;

use clap::Args;

use crate::cli::OutputFormat;
use crate::core::types::DEFAULT_DELIMITER;
use crate::graph::render::{self, RenderData, SamplePalette};
use crate::graph::{
    load_node_set, load_region, GraphConfig, LoadIssue, RegionQuery, DEFAULT_DISPLAY_LIMIT,
    DEFAULT_MAX_NODES,
};

#[derive(Args)]
pub struct SubgraphArgs {
    /// rGFA file (plain or gzip compressed)
    #[arg(required = true)]
    pub gfa: PathBuf,

    /// Contig to query
    #[arg(short, long, required_unless_present = "ids")]
    pub contig: Option<String>,

    /// Select exactly these segment ids instead of a region
    #[arg(short = 'i', long = "id", conflicts_with_all = ["contig", "from", "to", "samples"])]
    pub ids: Vec<String>,

    /// First position (1-based, inclusive)
    #[arg(short = 's', long)]
    pub from: Option<u64>,

    /// Last position (1-based, inclusive)
    #[arg(short = 'e', long)]
    pub to: Option<u64>,

    /// Only keep variants carried by these samples
    #[arg(short = 'l', long = "sample")]
    pub samples: Vec<String>,

    /// Backbone sample (default: the first one in the file)
    #[arg(short, long)]
    pub backbone: Option<String>,

    /// Separator inside SN and INF tags
    #[arg(long, default_value = DEFAULT_DELIMITER)]
    pub delimiter: String,

    /// Refuse to emit selections larger than this
    #[arg(long, default_value_t = DEFAULT_MAX_NODES)]
    pub max_nodes: usize,

    /// Warn about selections larger than this
    #[arg(long, default_value_t = DEFAULT_DISPLAY_LIMIT)]
    pub display_limit: usize,
}

impl SubgraphArgs {
    fn query(&self) -> anyhow::Result<RegionQuery> {
        let Some(contig) = &self.contig else {
            anyhow::bail!("A contig is required unless segment ids are given");
        };
        if let (Some(from), Some(to)) = (self.from, self.to) {
            if from > to {
                anyhow::bail!("Invalid region: start {from} is after end {to}");
            }
        }
        Ok(RegionQuery {
            contig: contig.clone(),
            from: self.from,
            to: self.to,
            samples: (!self.samples.is_empty()).then(|| self.samples.clone()),
        })
    }

    fn config(&self) -> GraphConfig {
        GraphConfig {
            delimiter: self.delimiter.clone(),
            max_nodes: self.max_nodes,
            display_limit: self.display_limit,
            ..GraphConfig::default()
        }
    }
}

pub fn run(args: SubgraphArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let config = args.config();

    let (graph, selection, label) = if args.ids.is_empty() {
        let query = args.query()?;
        let (graph, selection) = load_region(&args.gfa, &query, args.backbone.as_deref(), &config)?;
        (graph, selection, region_label(&query))
    } else {
        let (graph, selection) = load_node_set(&args.gfa, &args.ids, &config)?;
        (graph, selection, args.ids.join(","))
    };

    if verbose {
        eprintln!(
            "Loaded {} nodes and {} edges; selected {} nodes",
            graph.node_count(),
            graph.edge_count(),
            selection.len()
        );
    }

    if selection.signals.exceeds_max_nodes {
        anyhow::bail!(
            "Selection of {} nodes exceeds the limit of {}; narrow the region",
            selection.len(),
            config.max_nodes
        );
    }
    if selection.signals.exceeds_display_limit {
        tracing::warn!(
            "Selection of {} nodes is above {}; rendering may be slow",
            selection.len(),
            config.display_limit
        );
    }

    let palette = SamplePalette::from_graph(&graph);
    let data = render::build(&graph, &selection, &palette);

    match format {
        OutputFormat::Text => print_text_subgraph(&label, &data, &selection.issues),
        OutputFormat::Json => print_json_subgraph(&label, &data, &selection.issues)?,
        OutputFormat::Tsv => print_tsv_subgraph(&data),
    }

    Ok(())
}

fn region_label(query: &RegionQuery) -> String {
    let bound = |p: Option<u64>| p.map_or_else(|| "*".to_string(), |p| p.to_string());
    format!("{}:{}-{}", query.contig, bound(query.from), bound(query.to))
}

fn print_text_subgraph(label: &str, data: &RenderData, issues: &[LoadIssue]) {
    println!("Subgraph {label}");
    println!("{}", "=".repeat(60));
    println!();

    if data.signals.empty {
        println!("No nodes in the selected region.");
    } else {
        println!("Nodes ({}):", data.nodes.len());
        for node in &data.nodes {
            println!("  {:<10} {:<5} {}", node.id, node.shape, node.title);
        }
        println!();
        println!("Edges ({}):", data.edges.len());
        for edge in &data.edges {
            println!("  {} -> {} {}", edge.from, edge.to, edge.title);
        }
    }

    if !issues.is_empty() {
        println!();
        println!("Issues ({}):", issues.len());
        for issue in issues {
            println!("  - {issue}");
        }
    }
}

fn print_json_subgraph(label: &str, data: &RenderData, issues: &[LoadIssue]) -> anyhow::Result<()> {
    let output = serde_json::json!({
        "selection": label,
        "nodes": data.nodes,
        "edges": data.edges,
        "signals": data.signals,
        "issues": issues,
    });

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn print_tsv_subgraph(data: &RenderData) {
    println!("id\tshape\tcolor\tsize\tsample\ttitle");
    for node in &data.nodes {
        println!(
            "{}\t{}\t{}\t{}\t{}\t{}",
            node.id, node.shape, node.color, node.size, node.sample, node.title
        );
    }
}
