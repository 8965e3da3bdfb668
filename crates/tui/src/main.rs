mod renderer;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use planviz_core::svg::render_svg;
use planviz_core::views::swim_lanes::NAME_COLUMN_WIDTH;
use planviz_core::{DomainVizConfiguration, PlanViewEvent, PlanViewOptions, PlansView, parse_plan};
use planviz_protocol::Plan;

#[derive(Parser)]
#[command(name = "planviz", about = "Gantt chart and swim lanes for a computed plan")]
struct Cli {
    /// Plan document (JSON)
    plan: PathBuf,
    /// Domain visualization configuration (JSON)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Width in pixels the makespan is fitted into
    #[arg(long, default_value_t = 600.0)]
    width: f64,
    /// Duration drawn for instantaneous actions
    #[arg(long, default_value_t = 1e-3)]
    epsilon: f64,
    /// Override the plan's "now" cursor
    #[arg(long)]
    now: Option<f64>,
    /// Write an SVG file instead of opening the terminal view
    #[arg(long)]
    svg: Option<PathBuf>,
    /// Dark palette for the SVG output
    #[arg(long)]
    dark: bool,
    #[arg(long)]
    no_swimlanes: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    let data = std::fs::read(&cli.plan).with_context(|| format!("reading {}", cli.plan.display()))?;
    let mut plan = parse_plan(&data).with_context(|| format!("parsing {}", cli.plan.display()))?;
    if cli.now.is_some() {
        plan.now = cli.now;
    }

    let options = PlanViewOptions {
        disable_swimlanes: cli.no_swimlanes,
        self_contained: cli.svg.is_some(),
        ..PlanViewOptions::new(cli.width, cli.epsilon)
    };
    let mut plans = PlansView::new(options);
    if let Some(path) = &cli.config {
        let data = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
        let settings = DomainVizConfiguration::from_json(&data)
            .with_context(|| format!("parsing {}", path.display()))?;
        plans = plans.with_settings(Arc::new(settings));
    }

    let events = plans.add_plan(plan);
    handle_events(&mut plans, &events);

    match &cli.svg {
        Some(out) => {
            let view = plans.plan_view(0).context("plan view missing")?;
            let height = view.layout().map_or(0.0, |l| l.height);
            let width = NAME_COLUMN_WIDTH + cli.width + 200.0;
            let svg = render_svg(&view.render(), width, height, cli.dark);
            std::fs::write(out, svg).with_context(|| format!("writing {}", out.display()))?;
            tracing::info!(path = %out.display(), "wrote SVG");
        }
        None => renderer::render_tui(&mut plans)?,
    }
    Ok(())
}

/// Host side of the view's notifications.
pub(crate) fn handle_events(plans: &mut PlansView, events: &[PlanViewEvent]) -> Option<String> {
    let mut status = None;
    for event in events {
        match event {
            PlanViewEvent::LinePlotsVisible { plan_index } => {
                if let Some(view) = plans.plan_view_mut(*plan_index) {
                    let rows = view.plan().map(concurrency_rows).unwrap_or_default();
                    view.show_plan_line_plots(
                        "Concurrent actions",
                        "",
                        vec!["running".into()],
                        rows,
                    );
                }
            }
            PlanViewEvent::ActionSelected { action_name, .. } => {
                status = Some(format!("action: {action_name}"));
            }
            PlanViewEvent::HelpfulActionSelected { action_name, .. } => {
                status = Some(format!("apply helpful action: {action_name}"));
            }
            PlanViewEvent::PlanSelected { plan_index } => {
                tracing::debug!(plan_index, "plan selected");
            }
        }
    }
    status
}

/// Number of actions running at each happening of the plan.
fn concurrency_rows(plan: &Plan) -> Vec<Vec<Option<f64>>> {
    let mut times: Vec<f64> = plan
        .steps
        .iter()
        .flat_map(|s| [s.start_time, s.end_time()])
        .collect();
    times.sort_by(f64::total_cmp);
    times.dedup();
    times
        .into_iter()
        .map(|t| {
            let running = plan
                .steps
                .iter()
                .filter(|s| s.start_time <= t && t < s.end_time())
                .count();
            vec![Some(t), Some(running as f64)]
        })
        .collect()
}
