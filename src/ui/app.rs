use eframe::egui;
use tokio::sync::mpsc;

use crate::common::{ChatEvent, ClientCommand, LocalIdentity};

use super::components::{chat_area, input_bar, status_bar};
use super::state::AppState;

pub struct ChatApp {
    state: AppState,
    command_sender: mpsc::Sender<ClientCommand>,
    event_receiver: mpsc::UnboundedReceiver<ChatEvent>,
}

impl ChatApp {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        identity: LocalIdentity,
        command_sender: mpsc::Sender<ClientCommand>,
        event_receiver: mpsc::UnboundedReceiver<ChatEvent>,
    ) -> Self {
        Self {
            state: AppState::new(identity),
            command_sender,
            event_receiver,
        }
    }

    fn handle_network_events(&mut self) {
        while let Ok(event) = self.event_receiver.try_recv() {
            self.state.apply(event);
        }
    }

    fn send_command(&mut self, command: ClientCommand) {
        if let Err(err) = self.command_sender.try_send(command) {
            log::warn!("Failed to send command to network: {err}");
        }
    }
}

impl eframe::App for ChatApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.handle_network_events();

        egui::TopBottomPanel::top("status_bar").show(ctx, |ui| {
            status_bar::render(ui, &self.state);
        });

        egui::TopBottomPanel::bottom("input_panel").show(ctx, |ui| {
            let typing = self.state.typing_label().unwrap_or_default();
            ui.label(egui::RichText::new(typing).italics().weak());

            let action = input_bar::render(ui, &mut self.state.input_text);
            if action.changed {
                self.send_command(ClientCommand::InputChanged);
            }
            if action.submitted {
                if let Some(text) = self.state.take_input() {
                    self.send_command(ClientCommand::SubmitText(text));
                }
            }
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("Rust Room Chat");
            ui.separator();
            chat_area::render(ui, &self.state.lines);
        });

        ctx.request_repaint();
    }
}
