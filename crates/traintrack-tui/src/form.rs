//! Edit dialogs for athletes, groups and schedule entries.
//!
//! A `Form` only collects text. Validation happens in the store when the
//! form is submitted, so the rules live in one place.

use traintrack_core::models::{
    Athlete, AthleteDraft, AthleteStatus, Group, ScheduleDraft,
};

/// Longest value accepted in a text field.
const MAX_FIELD_LENGTH: usize = 64;

const WEEKDAYS: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

#[derive(Debug, Clone, PartialEq)]
pub enum FormKind {
    NewAthlete,
    /// Holds the athlete being edited so fields the form does not show
    /// (attendance, last visit) are submitted unchanged.
    EditAthlete(Athlete),
    EditGroup(Group),
    NewSchedule,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    Text,
    /// Value must be one of the options; cycled with left/right.
    Choice(Vec<String>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FormField {
    pub label: &'static str,
    pub value: String,
    pub kind: FieldKind,
}

impl FormField {
    fn text(label: &'static str, value: impl Into<String>) -> Self {
        Self {
            label,
            value: value.into(),
            kind: FieldKind::Text,
        }
    }

    /// Choice field starting at `current`, or the first option when
    /// `current` is not among them.
    fn choice(label: &'static str, options: Vec<String>, current: &str) -> Self {
        let value = if options.iter().any(|o| o == current) {
            current.to_string()
        } else {
            options.first().cloned().unwrap_or_default()
        };
        Self {
            label,
            value,
            kind: FieldKind::Choice(options),
        }
    }

    fn cycle(&mut self, forward: bool) {
        let FieldKind::Choice(options) = &self.kind else {
            return;
        };
        if options.is_empty() {
            return;
        }
        let len = options.len();
        let current = options.iter().position(|o| *o == self.value).unwrap_or(0);
        let next = if forward {
            (current + 1) % len
        } else {
            (current + len - 1) % len
        };
        self.value = options[next].clone();
    }
}

/// What a submitted form asks the store to do.
#[derive(Debug, Clone, PartialEq)]
pub enum Submission {
    CreateAthlete(AthleteDraft),
    UpdateAthlete(Athlete),
    UpdateGroup(Group),
    CreateSchedule(ScheduleDraft),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Form {
    pub kind: FormKind,
    pub fields: Vec<FormField>,
    pub focus: usize,
    pub error: Option<String>,
}

fn status_options() -> Vec<String> {
    AthleteStatus::ALL.iter().map(|s| s.as_str().to_string()).collect()
}

fn parse_status(value: &str) -> AthleteStatus {
    AthleteStatus::ALL
        .into_iter()
        .find(|s| s.as_str() == value)
        .unwrap_or_default()
}

impl Form {
    fn new(kind: FormKind, fields: Vec<FormField>) -> Self {
        Self {
            kind,
            fields,
            focus: 0,
            error: None,
        }
    }

    pub fn new_athlete(groups: Vec<String>) -> Self {
        Self::new(
            FormKind::NewAthlete,
            vec![
                FormField::text("Name", ""),
                FormField::choice("Group", groups, ""),
                FormField::choice("Status", status_options(), AthleteStatus::Active.as_str()),
            ],
        )
    }

    pub fn edit_athlete(athlete: &Athlete, groups: Vec<String>) -> Self {
        Self::new(
            FormKind::EditAthlete(athlete.clone()),
            vec![
                FormField::text("Name", athlete.name.clone()),
                FormField::choice("Group", groups, &athlete.group),
                FormField::choice("Status", status_options(), athlete.status.as_str()),
            ],
        )
    }

    pub fn edit_group(group: &Group) -> Self {
        Self::new(
            FormKind::EditGroup(group.clone()),
            vec![
                FormField::text("Name", group.name.clone()),
                FormField::text("Color", group.color.clone()),
            ],
        )
    }

    pub fn new_schedule(groups: Vec<String>) -> Self {
        let days = WEEKDAYS.iter().map(|d| d.to_string()).collect();
        Self::new(
            FormKind::NewSchedule,
            vec![
                FormField::choice("Group", groups, ""),
                FormField::choice("Day", days, "Monday"),
                FormField::text("Time", ""),
                FormField::text("Duration", "60 min"),
            ],
        )
    }

    pub fn title(&self) -> &'static str {
        match self.kind {
            FormKind::NewAthlete => "New Athlete",
            FormKind::EditAthlete(_) => "Edit Athlete",
            FormKind::EditGroup(_) => "Edit Group",
            FormKind::NewSchedule => "New Schedule Entry",
        }
    }

    pub fn focus_next(&mut self) {
        self.focus = (self.focus + 1) % self.fields.len();
    }

    pub fn focus_prev(&mut self) {
        self.focus = (self.focus + self.fields.len() - 1) % self.fields.len();
    }

    fn focused_mut(&mut self) -> Option<&mut FormField> {
        self.fields.get_mut(self.focus)
    }

    /// Append to the focused text field. Ignored on choice fields.
    pub fn push_char(&mut self, c: char) {
        if let Some(field) = self.focused_mut() {
            if field.kind == FieldKind::Text && can_add_field_char(field.value.chars().count(), c) {
                field.value.push(c);
            }
        }
    }

    pub fn pop_char(&mut self) {
        if let Some(field) = self.focused_mut() {
            if field.kind == FieldKind::Text {
                field.value.pop();
            }
        }
    }

    pub fn cycle_choice(&mut self, forward: bool) {
        if let Some(field) = self.focused_mut() {
            field.cycle(forward);
        }
    }

    fn value(&self, label: &str) -> String {
        self.fields
            .iter()
            .find(|f| f.label == label)
            .map(|f| f.value.trim().to_string())
            .unwrap_or_default()
    }

    /// Build the request described by the current field values.
    pub fn submission(&self) -> Submission {
        match &self.kind {
            FormKind::NewAthlete => Submission::CreateAthlete(AthleteDraft {
                name: self.value("Name"),
                group: self.value("Group"),
                status: parse_status(&self.value("Status")),
            }),
            FormKind::EditAthlete(original) => Submission::UpdateAthlete(Athlete {
                name: self.value("Name"),
                group: self.value("Group"),
                status: parse_status(&self.value("Status")),
                ..original.clone()
            }),
            FormKind::EditGroup(original) => Submission::UpdateGroup(Group {
                name: self.value("Name"),
                color: self.value("Color"),
                ..original.clone()
            }),
            FormKind::NewSchedule => Submission::CreateSchedule(ScheduleDraft {
                group: self.value("Group"),
                day: self.value("Day"),
                time: self.value("Time"),
                duration: self.value("Duration"),
            }),
        }
    }
}

/// Check if a character should be accepted into a text field
pub fn can_add_field_char(current_len: usize, c: char) -> bool {
    current_len < MAX_FIELD_LENGTH && !c.is_control()
}

#[cfg(test)]
mod tests {
    use super::*;
    use traintrack_core::models::Attendance;

    fn groups() -> Vec<String> {
        vec!["Boxers".into(), "Wrestlers".into(), "Crossfit".into()]
    }

    fn type_text(form: &mut Form, text: &str) {
        for c in text.chars() {
            form.push_char(c);
        }
    }

    #[test]
    fn test_new_athlete_submission() {
        let mut form = Form::new_athlete(groups());
        type_text(&mut form, "  Ivan Sokolov ");
        form.focus_next();
        form.cycle_choice(true);
        form.focus_next();
        form.cycle_choice(false);

        assert_eq!(
            form.submission(),
            Submission::CreateAthlete(AthleteDraft {
                name: "Ivan Sokolov".into(),
                group: "Wrestlers".into(),
                status: AthleteStatus::Rest,
            })
        );
    }

    #[test]
    fn test_choice_fields_ignore_typing() {
        let mut form = Form::new_athlete(groups());
        form.focus_next();
        type_text(&mut form, "xyz");
        form.pop_char();
        assert_eq!(form.fields[1].value, "Boxers");
    }

    #[test]
    fn test_edit_athlete_keeps_hidden_fields() {
        let athlete = Athlete {
            id: 3,
            name: "Dmitry Kozlov".into(),
            group: "Boxers".into(),
            attendance: Attendance::new(72).unwrap(),
            status: AthleteStatus::Injured,
            last_visit: "3 days ago".into(),
            checked: true,
        };
        let mut form = Form::edit_athlete(&athlete, groups());
        assert_eq!(form.fields[1].value, "Boxers");
        assert_eq!(form.fields[2].value, "injured");

        form.pop_char();
        let Submission::UpdateAthlete(updated) = form.submission() else {
            panic!("expected an athlete update");
        };
        assert_eq!(updated.name, "Dmitry Kozlo");
        assert_eq!(updated.attendance, athlete.attendance);
        assert_eq!(updated.last_visit, "3 days ago");
        assert!(updated.checked);
    }

    #[test]
    fn test_new_schedule_without_groups_submits_blank_group() {
        let form = Form::new_schedule(Vec::new());
        let Submission::CreateSchedule(draft) = form.submission() else {
            panic!("expected a schedule draft");
        };
        assert_eq!(draft.group, "");
        assert_eq!(draft.day, "Monday");
        assert_eq!(draft.duration, "60 min");
    }

    #[test]
    fn test_focus_wraps() {
        let mut form = Form::edit_group(&Group {
            id: 1,
            name: "Boxers".into(),
            count: 2,
            color: "bg-primary".into(),
        });
        assert_eq!(form.title(), "Edit Group");
        form.focus_prev();
        assert_eq!(form.focus, 1);
        form.focus_next();
        assert_eq!(form.focus, 0);
    }

    #[test]
    fn test_can_add_field_char() {
        assert!(can_add_field_char(0, 'a'));
        assert!(can_add_field_char(63, 'я'));
        assert!(!can_add_field_char(64, 'a'));
        assert!(!can_add_field_char(0, '\n'));
    }
}
