use slides_core::{Advisory, AppViewModel, ControlView, LinkRole, Tone};

const BAR_WIDTH: usize = 20;

/// Plain-text lines describing the view, top to bottom.
pub fn render(view: &AppViewModel) -> Vec<String> {
    let mut lines = Vec::new();

    lines.push(match &view.activity {
        Some(activity) => format!(
            "Activity: {} ({}) for {}",
            activity.title,
            activity.id,
            activity.grade_labels.join(", ")
        ),
        None if view.identifier_input.trim().is_empty() => "Activity: none".to_string(),
        None => format!("Activity: {} (not verified)", view.identifier_input.trim()),
    });
    push_advisory(&mut lines, "verify", &view.status.verify);

    lines.push(match view.grade {
        Some(grade) => format!("Grade: {grade}"),
        None => "Grade: not selected".to_string(),
    });

    lines.extend(link_lines(view));

    let controls = &view.controls;
    lines.push(control_line(&controls.generate));
    push_advisory(&mut lines, "generate", &controls.generate_advisory);
    if let Some(percent) = controls.progress {
        lines.push(format_progress(percent));
    }
    push_advisory(&mut lines, "generate", &view.status.generation);

    lines.push(control_line(&controls.sync_links));
    push_advisory(&mut lines, "links", &controls.sync_links_advisory);
    push_advisory(&mut lines, "links", &view.status.sync_links);

    lines.push(control_line(&controls.create_variation));
    push_advisory(&mut lines, "variation", &controls.create_variation_advisory);
    push_advisory(&mut lines, "variation", &view.status.variation);

    if let Some(prompt) = &controls.export_prompt {
        lines.push(format!("Export: {}", prompt.notice));
    }
    lines
}

/// One line per share link plus any alert under it.
pub fn link_lines(view: &AppViewModel) -> Vec<String> {
    let mut lines = Vec::new();
    for link in &view.links {
        let shown = if link.raw.trim().is_empty() {
            "(empty)".to_string()
        } else {
            format!("{} [{}]", link.raw.trim(), link.kind)
        };
        lines.push(format!("{}: {}", role_label(link.role), shown));
        push_advisory(&mut lines, role_label(link.role), &link.alert);
    }
    lines
}

fn role_label(role: LinkRole) -> &'static str {
    match role {
        LinkRole::Collaboration => "Collaboration link",
        LinkRole::Template => "Template link",
        LinkRole::PublicView => "Public view link",
    }
}

fn control_line(control: &ControlView) -> String {
    let state = if control.loading {
        "busy"
    } else if control.disabled {
        "off"
    } else {
        "ready"
    };
    format!("[{state}] {}", control.label)
}

fn push_advisory(lines: &mut Vec<String>, scope: &str, advisory: &Advisory) {
    if !advisory.visible || advisory.message.is_empty() {
        return;
    }
    let marker = match advisory.tone {
        Tone::Info => "..",
        Tone::Warn => "!!",
        Tone::Positive => "ok",
    };
    lines.push(format!("  {marker} {scope}: {}", advisory.message));
}

fn format_progress(percent: u8) -> String {
    let percent = percent.min(100);
    let filled = usize::from(percent) * BAR_WIDTH / 100;
    format!(
        "Progress: [{}{}] {}%",
        "#".repeat(filled),
        ".".repeat(BAR_WIDTH - filled),
        percent
    )
}

#[cfg(test)]
mod tests {
    use slides_core::{update, AppState, ButtonVariant, Msg};

    use super::*;

    #[test]
    fn blank_state_asks_for_an_activity() {
        let lines = render(&AppState::new().view());
        assert_eq!(lines[0], "Activity: none");
        assert!(lines.iter().any(|l| l.contains("!! generate:")));
        assert!(lines.iter().all(|l| !l.starts_with("Progress")));
    }

    #[test]
    fn typed_identifier_shows_as_unverified() {
        let (state, _) = update(AppState::new(), Msg::IdentifierChanged(" abc ".to_string()));
        assert_eq!(render(&state.view())[0], "Activity: abc (not verified)");
    }

    #[test]
    fn control_line_marks_busy_before_disabled() {
        let mut control = ControlView {
            disabled: false,
            label: "Generate slides for 1-2".to_string(),
            loading: false,
            variant: ButtonVariant::Primary,
        };
        assert_eq!(control_line(&control), "[ready] Generate slides for 1-2");

        control.disabled = true;
        assert_eq!(control_line(&control), "[off] Generate slides for 1-2");

        control.loading = true;
        assert_eq!(control_line(&control), "[busy] Generate slides for 1-2");
    }

    #[test]
    fn progress_bar_scales_to_width() {
        assert_eq!(
            format_progress(43),
            "Progress: [########............] 43%"
        );
        assert_eq!(format_progress(100), format!("Progress: [{}] 100%", "#".repeat(20)));
        assert_eq!(format_progress(0), format!("Progress: [{}] 0%", ".".repeat(20)));
        assert_eq!(format_progress(250), format_progress(100));
    }
}
