// Pure projection from the coordinator's DisplayState to menu directives.
// The presenter draws these top to bottom; nothing here touches UI handles.
use crate::model::{DisplayPart, DisplayState, MealMenu, TimetablePeriod};
use crate::segment::segment_dish;

pub const NETWORK_ADVISORY: &str = "⚠️ 네트워크에 연결되어 있지 않아요!";
pub const NO_SCHOOL_BANNER: &str = "❌ 아직 등록된 학교가 없어요!";
pub const REFRESHING_STATUS: &str = "⏳ 새로고침 중...";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderDirective {
    /// Standing warning while connectivity is reported down.
    Advisory(String),
    /// School / selection header, may span lines.
    Banner(String),
    Separator,
    /// One dish or period. `emphasis` is the text drawn bold/colored.
    Entry {
        lines: Vec<String>,
        emphasis: Option<String>,
    },
    /// Placeholder when there is nothing to show for the selected part.
    Empty(String),
    Status(String),
}

pub fn render(state: &DisplayState) -> Vec<RenderDirective> {
    let mut out = Vec::new();
    let part = state.selection.part;

    if !state.network_reachable {
        out.push(RenderDirective::Advisory(NETWORK_ADVISORY.to_string()));
    }

    match &state.school {
        Some(school) => {
            let text = match part {
                DisplayPart::Timetable => format!(
                    "🏫 {}\n{}학년 {}반의 시간표에요!",
                    school.school_name, state.selection.grade, state.selection.class_number
                ),
                _ => format!("🏫 {}\n오늘 {}이에요!", school.school_name, part),
            };
            out.push(RenderDirective::Banner(text));
            out.push(RenderDirective::Separator);
        }
        None => out.push(RenderDirective::Banner(NO_SCHOOL_BANNER.to_string())),
    }

    if state.is_refreshing {
        out.push(RenderDirective::Status(REFRESHING_STATUS.to_string()));
    }

    match part.meal_type() {
        Some(meal) => {
            let dishes = state
                .meal
                .as_ref()
                .map(|m: &MealMenu| m.get(meal))
                .unwrap_or(&[]);
            render_meal(&mut out, part, dishes);
        }
        None => render_timetable(&mut out, &state.timetable),
    }

    out
}

fn render_meal(out: &mut Vec<RenderDirective>, part: DisplayPart, dishes: &[String]) {
    out.push(RenderDirective::Separator);
    let before = out.len();
    for dish in dishes {
        let lines = segment_dish(dish);
        if lines.is_empty() {
            continue;
        }
        let emphasis = lines.first().cloned();
        out.push(RenderDirective::Entry { lines, emphasis });
    }
    if out.len() == before {
        out.push(RenderDirective::Empty(format!(
            "오늘 {}을 찾을 수 없어요!",
            part
        )));
    }
    out.push(RenderDirective::Separator);
}

/// `periods` is stored descending; the menu lists first period first.
fn render_timetable(out: &mut Vec<RenderDirective>, periods: &[TimetablePeriod]) {
    if periods.is_empty() {
        out.push(RenderDirective::Empty(
            "오늘 시간표를 찾을 수 없어요!".to_string(),
        ));
        return;
    }
    for period in periods.iter().rev() {
        let label = format!("{}교시", period.period);
        out.push(RenderDirective::Entry {
            lines: vec![label.clone(), period.content.clone()],
            emphasis: Some(label),
        });
    }
}

/// Flattens directives into text for line-oriented presenters.
pub fn to_plain_text(directives: &[RenderDirective]) -> String {
    let mut buf = String::new();
    for directive in directives {
        match directive {
            RenderDirective::Advisory(text)
            | RenderDirective::Banner(text)
            | RenderDirective::Empty(text)
            | RenderDirective::Status(text) => {
                buf.push_str(text);
                buf.push('\n');
            }
            RenderDirective::Separator => buf.push_str("────────────\n"),
            RenderDirective::Entry { lines, .. } => {
                for line in lines {
                    buf.push_str("  ");
                    buf.push_str(line);
                    buf.push('\n');
                }
            }
        }
    }
    buf
}
