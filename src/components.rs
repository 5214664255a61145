//! Badges, CSS class lookups and tooltip content for course reports.
//!
//! Everything here returns markup or class names; attaching it to a page is
//! left to the host.

use crate::html::escape;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};

lazy_static! {
    static ref LEADING_FLOAT: Regex =
        Regex::new(r"^[+-]?(?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?").unwrap();
}

/// Delivery type of a course.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum CourseType {
    #[default]
    Theory,
    Practical,
    Coop,
    Mixed,
    #[serde(rename = "self")]
    SelfPaced,
}

impl CourseType {
    /// Unknown names fall back to [`CourseType::Theory`].
    pub fn from_name(name: &str) -> Self {
        match name {
            "practical" => CourseType::Practical,
            "coop" => CourseType::Coop,
            "mixed" => CourseType::Mixed,
            "self" => CourseType::SelfPaced,
            _ => CourseType::Theory,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            CourseType::Theory => "theory",
            CourseType::Practical => "practical",
            CourseType::Coop => "coop",
            CourseType::Mixed => "mixed",
            CourseType::SelfPaced => "self",
        }
    }

    fn label(self) -> (&'static str, &'static str) {
        match self {
            CourseType::Theory => ("نظري", "ن"),
            CourseType::Practical => ("عملي", "ع"),
            CourseType::Coop => ("تعاوني", "ت"),
            CourseType::Mixed => ("مدمج", "م"),
            CourseType::SelfPaced => ("ذاتي", "ذ"),
        }
    }
}

/// Badge markup for a course type name.
pub fn type_badge(type_name: &str) -> String {
    let kind = CourseType::from_name(type_name);
    let (title, letter) = kind.label();
    format!(
        "<span class=\"type-badge type-badge-{}\" title=\"{}\">{}</span>",
        kind.name(),
        title,
        letter
    )
}

/// CSS class for a section density (trainees per section).
pub fn density_class(value: f64) -> &'static str {
    if value > 20.0 {
        "density-high"
    } else if value >= 10.0 {
        "density-medium"
    } else if value >= 5.0 {
        "density-low"
    } else {
        "density-critical"
    }
}

/// CSS class for a pass rate given as text (e.g. `"72.5%"`).
///
/// The leading number of the text is used; text without one counts as a low
/// pass rate.
pub fn pass_class(raw: &str) -> &'static str {
    match leading_float(raw) {
        Some(v) if v >= 70.0 => "pass-high",
        Some(v) if v >= 50.0 => "pass-medium",
        _ => "pass-low",
    }
}

fn leading_float(raw: &str) -> Option<f64> {
    LEADING_FLOAT
        .find(raw.trim_start())
        .and_then(|m| m.as_str().parse().ok())
}

/// One section of a course.
#[derive(Clone, Serialize, Deserialize, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    pub ref_num: String,
    #[serde(default)]
    pub department: String,
    #[serde(default)]
    pub specialty: String,
    #[serde(default)]
    pub schedule_type: String,
    #[serde(default)]
    pub instructor: Option<String>,
    #[serde(default)]
    pub trainees: BTreeSet<String>,
}

/// Aggregated data of one course, as held by the report page.
#[derive(Clone, Serialize, Deserialize, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub code: String,
    #[serde(default)]
    pub schedule_type: String,
    /// Instructor name to number of sections taught.
    #[serde(default)]
    pub instructors: BTreeMap<String, u32>,
    #[serde(default)]
    pub section_details: Option<Vec<Section>>,
}

/// Courses keyed by course code (or by a composite code/schedule key).
pub type CourseCatalog = HashMap<String, Course>;

/// Tooltip content plus the element it belongs in.
#[derive(Clone, Debug, PartialEq)]
pub struct Tooltip {
    pub id: &'static str,
    pub class: &'static str,
    pub html: String,
}

/// Instructors of a course, busiest first.
///
/// `None` when the course is unknown or has no instructors.
pub fn instructor_tooltip(catalog: &CourseCatalog, course_code: &str) -> Option<Tooltip> {
    let course = catalog.get(course_code)?;
    if course.instructors.is_empty() {
        return None;
    }

    let mut instructors: Vec<(&String, &u32)> = course.instructors.iter().collect();
    // stable: equal counts stay in name order
    instructors.sort_by(|a, b| b.1.cmp(a.1));

    let mut html = format!("<h4>مدربو المقرر: {}</h4>", escape(course_code));
    html.push_str("<table><tr><th>المدرب</th><th>عدد الشعب</th></tr>");
    for (name, count) in instructors {
        html.push_str(&format!(
            "<tr><td>{}</td><td style=\"text-align:center;\">{}</td></tr>",
            escape(name),
            count
        ));
    }
    html.push_str("</table>");

    Some(Tooltip {
        id: "instructorTooltip",
        class: "instructor-tooltip",
        html,
    })
}

/// Section breakdown of a course.
///
/// `None` when the course is unknown or carries no section details at all; an
/// empty detail list still yields a tooltip with an empty table.
pub fn sections_tooltip(catalog: &CourseCatalog, composite_key: &str) -> Option<Tooltip> {
    let course = catalog.get(composite_key)?;
    let sections = course.section_details.as_ref()?;

    let mut html = format!(
        "<h4>تفاصيل الشعب - {} ({})</h4>",
        escape(&course.code),
        escape(&course.schedule_type)
    );
    html.push_str("<table><thead><tr>");
    for heading in [
        "الرقم المرجعي",
        "القسم",
        "التخصص",
        "نوع الجدولة",
        "المدرب",
        "المتدربين",
    ] {
        html.push_str(&format!("<th>{}</th>", heading));
    }
    html.push_str("</tr></thead><tbody>");

    for sec in sections {
        let instructor = sec
            .instructor
            .as_deref()
            .filter(|name| !name.is_empty())
            .unwrap_or("-");
        html.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            escape(&sec.ref_num),
            escape(&sec.department),
            escape(&sec.specialty),
            escape(&sec.schedule_type),
            escape(instructor),
            sec.trainees.len()
        ));
    }
    html.push_str("</tbody></table>");

    Some(Tooltip {
        id: "sectionsTooltip",
        class: "sections-tooltip",
        html,
    })
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

/// Top-left corner for the instructor tooltip: below-right of the cursor,
/// flipped to the other side on an axis where it would leave the viewport.
pub fn place_instructor_tooltip(cursor: Point, tooltip: Size, viewport: Size) -> Point {
    let mut at = Point {
        x: cursor.x + 15.0,
        y: cursor.y + 15.0,
    };
    if at.x + tooltip.width > viewport.width {
        at.x = cursor.x - tooltip.width - 10.0;
    }
    if at.y + tooltip.height > viewport.height {
        at.y = cursor.y - tooltip.height - 10.0;
    }
    at
}

/// Top-left corner for the (wide) sections tooltip.
pub fn place_sections_tooltip(cursor: Point, viewport: Size) -> Point {
    Point {
        x: (cursor.x - 300.0).min(viewport.width - 620.0),
        y: (cursor.y + 20.0).min(viewport.height - 420.0),
    }
}
