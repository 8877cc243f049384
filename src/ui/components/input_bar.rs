use eframe::egui;

/// What the user did with the input bar this frame.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct InputAction {
    pub changed: bool,
    pub submitted: bool,
}

pub fn render(ui: &mut egui::Ui, input_text: &mut String) -> InputAction {
    let mut action = InputAction::default();
    ui.horizontal(|ui| {
        let response = ui.add(
            egui::TextEdit::singleline(input_text)
                .hint_text("Type a message...")
                .desired_width(ui.available_width() - 60.0),
        );
        action.changed = response.changed();

        if ui.button("Send").clicked() {
            action.submitted = true;
        }

        if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
            action.submitted = true;
            response.request_focus();
        }
    });

    action
}
