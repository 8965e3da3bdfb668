use planviz_protocol::{DomainInfo, Plan, PlanStep, Point, Rect, RenderCommand, TextAlign, ThemeToken};

use super::{FONT_SIZE, action_color, tooltip_table};
use crate::layout::{SwimLane, TimeScale, split_duration};
use crate::options::PlanViewOptions;
use crate::settings::PlanVizSettings;

/// Width of the object-name column left of the lanes.
pub const NAME_COLUMN_WIDTH: f64 = 120.0;
/// Minimum pixel width an action occupies in a lane.
const LANE_SEPARATION: f64 = 1.0;
const BAR_GAP: f64 = 2.0;

/// One action drawn in an object's row.
#[derive(Debug, Clone, PartialEq)]
pub struct LaneBar {
    /// Index into `Plan::steps`.
    pub step_index: usize,
    pub lane: usize,
    /// Relative to the row's lane area.
    pub rect: Rect,
    pub color: ThemeToken,
    pub label: String,
    pub tooltip: String,
}

/// All actions involving one object, packed into sub-lanes.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectRow {
    pub object: String,
    pub lane_count: usize,
    pub height: f64,
    pub bars: Vec<LaneBar>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeSection {
    pub type_name: String,
    pub rows: Vec<ObjectRow>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SwimLanesLayout {
    pub sections: Vec<TypeSection>,
    pub header_height: f64,
}

impl SwimLanesLayout {
    pub fn height(&self) -> f64 {
        self.sections
            .iter()
            .map(|s| self.header_height + s.rows.iter().map(|r| r.height).sum::<f64>())
            .sum()
    }

    pub fn row(&self, object: &str) -> Option<&ObjectRow> {
        self.sections
            .iter()
            .flat_map(|s| &s.rows)
            .find(|r| r.object == object)
    }
}

/// Whether `step` belongs in the swim lane of `object`.
///
/// The object has to be bound to at least one action parameter that the
/// settings do not ignore. Actions the domain does not declare fall back
/// to a plain membership test.
pub fn should_display_object(
    step: &PlanStep,
    object: &str,
    domain: Option<&DomainInfo>,
    settings: Option<&dyn PlanVizSettings>,
) -> bool {
    if !settings.is_none_or(|s| s.should_display(step)) {
        return false;
    }

    let Some(action) = domain.and_then(|d| d.find_action(&step.action_name)) else {
        tracing::debug!(action = %step.action_name, "unexpected plan action");
        return step.objects.iter().any(|o| o.eq_ignore_ascii_case(object));
    };

    step.objects
        .iter()
        .enumerate()
        .filter(|(_, o)| o.eq_ignore_ascii_case(object))
        .any(|(position, _)| {
            action.parameters.get(position).is_some_and(|parameter| {
                !settings.is_some_and(|s| {
                    s.should_ignore_action_parameter(&action.name, &parameter.name)
                })
            })
        })
}

/// Lay out one swim-lane row per object, grouped by domain type.
///
/// Returns `None` when swim lanes are disabled or the plan carries no
/// domain or problem to take the objects from.
pub fn layout_swim_lanes(
    plan: &Plan,
    settings: Option<&dyn PlanVizSettings>,
    options: &PlanViewOptions,
) -> Option<SwimLanesLayout> {
    if options.disable_swimlanes {
        return None;
    }
    let (domain, problem) = (plan.domain.as_ref()?, plan.problem.as_ref()?);

    let scale = TimeScale::new(plan.makespan(), options.display_width, options.epsilon);
    let all_objects = domain.constants.merge(&problem.objects);

    let sections = domain
        .types
        .iter()
        .filter(|t| t.as_str() != "object")
        .filter_map(|type_name| {
            let objects = all_objects.objects_of_case_insensitive(type_name)?;
            Some(TypeSection {
                type_name: type_name.clone(),
                rows: objects
                    .iter()
                    .map(|object| layout_object_row(plan, object, &scale, settings, options))
                    .collect(),
            })
        })
        .collect();

    Some(SwimLanesLayout {
        sections,
        header_height: options.plan_step_height,
    })
}

fn layout_object_row(
    plan: &Plan,
    object: &str,
    scale: &TimeScale,
    settings: Option<&dyn PlanVizSettings>,
    options: &PlanViewOptions,
) -> ObjectRow {
    let step_height = options.plan_step_height;
    let mut lanes = SwimLane::new(LANE_SEPARATION);

    let bars = plan
        .steps
        .iter()
        .enumerate()
        .filter(|(_, step)| should_display_object(step, object, plan.domain.as_ref(), settings))
        .map(|(step_index, step)| {
            let split = split_duration(step, plan.now, options.epsilon);
            let left = scale.to_view(Some(step.start_time));
            let width = scale.to_view(Some(split.plan_head)).max(1.0)
                + scale.to_view(Some(split.relaxed));
            let lane = lanes.place_next(left, width);
            let objects: Vec<&str> = step
                .objects
                .iter()
                .map(|o| {
                    if o.eq_ignore_ascii_case(object) {
                        "@"
                    } else {
                        o.as_str()
                    }
                })
                .collect();
            LaneBar {
                step_index,
                lane,
                rect: Rect::new(
                    left,
                    lane as f64 * step_height + 1.0,
                    width,
                    (step_height - BAR_GAP).max(1.0),
                ),
                color: action_color(&step.action_name, plan.domain.as_ref()),
                label: format!("{} {}", step.action_name, objects.join(" ")),
                tooltip: tooltip_table(step),
            }
        })
        .collect();

    let lane_count = lanes.lane_count();
    ObjectRow {
        object: object.to_string(),
        lane_count,
        height: lane_count.max(1) as f64 * step_height,
        bars,
    }
}

pub fn render_swim_lanes(layout: &SwimLanesLayout, options: &PlanViewOptions) -> Vec<RenderCommand> {
    let lane_area_width = options.display_width;
    let text_offset = options.plan_step_height / 2.0 + FONT_SIZE * 0.35;
    let mut commands = Vec::new();

    commands.push(RenderCommand::BeginGroup {
        id: "swim-lanes".into(),
        label: Some("Resource utilization".into()),
    });

    let mut y = 0.0;
    for section in &layout.sections {
        commands.push(RenderCommand::DrawRect {
            rect: Rect::new(0.0, y, NAME_COLUMN_WIDTH + lane_area_width, layout.header_height),
            color: ThemeToken::LaneHeaderBackground,
            border_color: None,
            label: None,
            tooltip: None,
            link: None,
        });
        commands.push(RenderCommand::DrawText {
            position: Point::new(4.0, y + text_offset),
            text: section.type_name.clone(),
            color: ThemeToken::LaneHeaderText,
            font_size: FONT_SIZE,
            align: TextAlign::Left,
            link: None,
        });
        y += layout.header_height;

        for row in &section.rows {
            commands.push(RenderCommand::BeginGroup {
                id: format!("lane-{}", row.object),
                label: Some(row.object.clone()),
            });
            commands.push(RenderCommand::DrawRect {
                rect: Rect::new(NAME_COLUMN_WIDTH, y, lane_area_width, row.height),
                color: ThemeToken::LaneBackground,
                border_color: Some(ThemeToken::LaneBorder),
                label: None,
                tooltip: None,
                link: None,
            });
            commands.push(RenderCommand::DrawText {
                position: Point::new(4.0, y + text_offset),
                text: row.object.clone(),
                color: ThemeToken::TextPrimary,
                font_size: FONT_SIZE,
                align: TextAlign::Left,
                link: None,
            });
            for bar in &row.bars {
                commands.push(RenderCommand::DrawRect {
                    rect: Rect::new(NAME_COLUMN_WIDTH + bar.rect.x, y + bar.rect.y, bar.rect.w, bar.rect.h),
                    color: bar.color,
                    border_color: None,
                    label: Some(bar.label.clone()),
                    tooltip: Some(bar.tooltip.clone()),
                    link: None,
                });
            }
            commands.push(RenderCommand::EndGroup);
            y += row.height;
        }
    }

    commands.push(RenderCommand::EndGroup);
    commands
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::DomainVizConfiguration;
    use planviz_protocol::{ActionDefinition, Parameter, ProblemInfo, TypeObjectMap};

    fn parameter(name: &str) -> Parameter {
        Parameter {
            name: name.into(),
            type_name: None,
        }
    }

    fn driverlog_domain() -> DomainInfo {
        DomainInfo {
            name: "driverlog".into(),
            types: vec![
                "object".into(),
                "truck".into(),
                "location".into(),
                "driver".into(),
            ],
            constants: TypeObjectMap::new(),
            actions: vec![
                ActionDefinition {
                    name: "load-truck".into(),
                    parameters: vec![parameter("?obj"), parameter("?truck"), parameter("?loc")],
                },
                ActionDefinition {
                    name: "drive-truck".into(),
                    parameters: vec![
                        parameter("?v"),
                        parameter("?loc-from"),
                        parameter("?loc-to"),
                        parameter("?driver"),
                    ],
                },
            ],
        }
    }

    fn drive_step() -> PlanStep {
        PlanStep::new(1.002, "DRIVE-TRUCK truck1 s0 s2 driver1", true, Some(10.0))
    }

    #[test]
    fn shows_step_in_every_bound_object_lane() {
        let domain = driverlog_domain();
        for object in ["truck1", "s0", "s2", "driver1"] {
            assert!(should_display_object(&drive_step(), object, Some(&domain), None), "{object}");
        }
        assert!(!should_display_object(&drive_step(), "truck2", Some(&domain), None));
    }

    #[test]
    fn ignored_parameter_hides_object_lane() {
        let domain = driverlog_domain();
        let settings = DomainVizConfiguration::from_json(
            br#"{"ignoreActionParameters": [{"action": "DRIVE-TRUCK", "parameterPattern": "loc-to"}]}"#,
        )
        .unwrap_or_default();
        assert!(!should_display_object(&drive_step(), "s2", Some(&domain), Some(&settings)));
        assert!(should_display_object(&drive_step(), "s0", Some(&domain), Some(&settings)));
    }

    #[test]
    fn object_bound_twice_is_shown_if_any_parameter_is_kept() {
        let domain = driverlog_domain();
        let settings = DomainVizConfiguration::from_json(
            br#"{"ignoreActionParameters": [{"action": "drive", "parameterPattern": "loc-from"}]}"#,
        )
        .unwrap_or_default();
        let round_trip = PlanStep::new(0.0, "drive-truck truck1 s0 s0 driver1", true, Some(1.0));
        assert!(should_display_object(&round_trip, "s0", Some(&domain), Some(&settings)));
    }

    #[test]
    fn excluded_action_is_hidden_everywhere() {
        let domain = driverlog_domain();
        let settings =
            DomainVizConfiguration::from_json(br#"{"excludeActions": ["^drive"]}"#).unwrap_or_default();
        assert!(!should_display_object(&drive_step(), "truck1", Some(&domain), Some(&settings)));
    }

    #[test]
    fn unknown_action_falls_back_to_membership() {
        let step = PlanStep::new(1.002, "UNKNOWN obj1", true, Some(10.0));
        assert!(should_display_object(&step, "obj1", None, None));
        assert!(!should_display_object(&step, "unknownObject", None, None));
    }

    fn driverlog_plan() -> Plan {
        let problem = ProblemInfo {
            name: "p1".into(),
            domain_name: "driverlog".into(),
            objects: TypeObjectMap::new()
                .add_all("truck", ["truck1"])
                .add_all("location", ["s0", "s1", "s2"])
                .add_all("driver", ["driver1"])
                .add_all("package", ["p1"]),
        };
        Plan {
            domain: Some(driverlog_domain()),
            problem: Some(problem),
            ..Plan::new(vec![
                PlanStep::new(0.0, "load-truck p1 truck1 s0", true, Some(2.0)),
                PlanStep::new(0.0, "load-truck p1 truck1 s0", true, Some(2.0)),
                PlanStep::new(2.0, "drive-truck truck1 s0 s1 driver1", true, Some(8.0)),
            ])
        }
    }

    #[test]
    fn packs_overlapping_actions_into_sub_lanes() {
        let options = PlanViewOptions::new(100.0, 1e-3);
        let layout = layout_swim_lanes(&driverlog_plan(), None, &options);
        let layout = layout.unwrap_or_default();

        let types: Vec<&str> = layout.sections.iter().map(|s| s.type_name.as_str()).collect();
        assert_eq!(types, ["truck", "location", "driver"]);

        let truck = layout.row("truck1");
        let lanes: Vec<usize> = truck.map(|r| r.bars.iter().map(|b| b.lane).collect()).unwrap_or_default();
        assert_eq!(lanes, [0, 1, 0]);
        assert_eq!(truck.map(|r| (r.lane_count, r.height)), Some((2, 40.0)));

        let s1 = layout.row("s1").map(|r| r.bars.clone()).unwrap_or_default();
        assert_eq!(s1.len(), 1);
        assert_eq!(s1[0].label, "drive-truck truck1 s0 @ driver1");
        assert_eq!(s1[0].rect, Rect::new(20.0, 1.0, 80.0, 18.0));

        let s2 = layout.row("s2").map(|r| (r.lane_count, r.height));
        assert_eq!(s2, Some((0, 20.0)));
    }

    #[test]
    fn each_row_gets_its_own_packer() {
        let options = PlanViewOptions::new(100.0, 1e-3);
        let layout = layout_swim_lanes(&driverlog_plan(), None, &options).unwrap_or_default();
        // The driver's only action starts on lane 0 even though the truck
        // row already opened two lanes.
        let driver = layout.row("driver1").map(|r| r.bars[0].lane);
        assert_eq!(driver, Some(0));
    }

    #[test]
    fn disabled_or_missing_problem_yields_no_swim_lanes() {
        let disabled = PlanViewOptions {
            disable_swimlanes: true,
            ..PlanViewOptions::default()
        };
        assert!(layout_swim_lanes(&driverlog_plan(), None, &disabled).is_none());

        let no_problem = Plan {
            problem: None,
            ..driverlog_plan()
        };
        assert!(layout_swim_lanes(&no_problem, None, &PlanViewOptions::default()).is_none());
    }

    #[test]
    fn renders_header_and_rows() {
        let options = PlanViewOptions::new(100.0, 1e-3);
        let layout = layout_swim_lanes(&driverlog_plan(), None, &options).unwrap_or_default();
        let cmds = render_swim_lanes(&layout, &options);
        let labels: Vec<&str> = cmds
            .iter()
            .filter_map(|c| match c {
                RenderCommand::DrawRect { label: Some(l), .. } => Some(l.as_str()),
                _ => None,
            })
            .collect();
        // truck1 and s0 see all three actions, s1 and driver1 only the drive.
        assert_eq!(labels.len(), 3 + 3 + 1 + 1);
        assert!((crate::views::commands_extent(&cmds) - layout.height()).abs() < 1e-9);
    }
}
