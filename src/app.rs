//! Main application UI and state management.
//! Drives the review surface and the rapid-fire quiz screens.

use crate::export::json::{export_cards_to_path, import_cards};
use crate::models::schedule::{RevisionSetting, RevisionUnit};
use crate::models::{CardPatch, Profile, QuizSession, ReviewCommand, ReviewModel, Verdict};
use chrono::Utc;
use eframe::egui;
use rusqlite::Connection;
use std::time::{Duration, Instant};

/// Application screen states
#[derive(Default)]
enum AppScreen {
    #[default]
    Review,
    Quiz,
}

/// In-progress edit of an existing card.
struct EditDraft {
    id: String,
    front: String,
    back: String,
}

/// Main application state
pub struct StudyApp {
    conn: Connection,
    profile: Profile,
    review: ReviewModel,

    current_screen: AppScreen,
    quiz: Option<QuizSession>,
    quiz_answer: String,
    quiz_question: usize,
    last_tick: Instant,

    new_front: String,
    new_back: String,
    new_interval: String,
    new_unit: RevisionUnit,
    editing: Option<EditDraft>,

    show_result_dialog: bool,
    result_message: String,
}

impl eframe::App for StudyApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if matches!(self.current_screen, AppScreen::Quiz) {
            self.drive_quiz_clock(ctx);
        }

        match self.current_screen {
            AppScreen::Review => self.render_review_screen(ctx),
            AppScreen::Quiz => self.render_quiz_screen(ctx),
        }

        self.render_edit_dialog(ctx);

        if self.show_result_dialog {
            egui::Window::new("Import/Export Result")
                .collapsible(false)
                .resizable(false)
                .show(ctx, |ui| {
                    ui.label(&self.result_message);
                    ui.add_space(10.0);
                    if ui.button("OK").clicked() {
                        self.show_result_dialog = false;
                    }
                });
        }
    }
}

impl StudyApp {
    /// Creates the application with cards already loaded from the store.
    pub fn new(conn: Connection, profile: Profile, review: ReviewModel) -> Self {
        Self {
            conn,
            profile,
            review,
            current_screen: AppScreen::Review,
            quiz: None,
            quiz_answer: String::new(),
            quiz_question: 0,
            last_tick: Instant::now(),
            new_front: String::new(),
            new_back: String::new(),
            new_interval: "1".to_string(),
            new_unit: RevisionUnit::Days,
            editing: None,
            show_result_dialog: false,
            result_message: String::new(),
        }
    }

    /// Feeds one-second ticks to the quiz and keeps frames coming while the
    /// countdown runs. Clears the typed answer when the question changes.
    fn drive_quiz_clock(&mut self, ctx: &egui::Context) {
        let Some(session) = &mut self.quiz else {
            return;
        };

        if self.last_tick.elapsed() >= Duration::from_secs(1) {
            session.tick(Utc::now());
            self.last_tick = Instant::now();
        }
        ctx.request_repaint_after(Duration::from_millis(100));

        if let Some((question, _)) = session.progress() {
            if question != self.quiz_question {
                self.quiz_question = question;
                self.quiz_answer.clear();
            }
        }
    }

    /// Renders the card list with the create form and per-card actions.
    fn render_review_screen(&mut self, ctx: &egui::Context) {
        let now = Utc::now();

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading("Rapid Cards");
                ui.label(format!("({})", self.profile.display_name));
            });
            ui.separator();

            ui.horizontal(|ui| {
                if ui.button("Rapid Fire Quiz").clicked() {
                    self.start_quiz();
                }
                if ui.button("Export Cards").clicked() {
                    self.handle_export();
                }
                if ui.button("Import Cards").clicked() {
                    self.handle_import();
                }
            });

            ui.separator();

            // Card creation section
            ui.heading("Add Card");
            ui.horizontal(|ui| {
                ui.label("Front:");
                ui.text_edit_singleline(&mut self.new_front);
            });
            ui.horizontal(|ui| {
                ui.label("Back:");
                ui.text_edit_singleline(&mut self.new_back);
            });
            ui.horizontal(|ui| {
                ui.label("Repeat every:");
                ui.add(egui::TextEdit::singleline(&mut self.new_interval).desired_width(40.0));
                egui::ComboBox::from_id_source("new_unit")
                    .selected_text(self.new_unit.name())
                    .show_ui(ui, |ui| {
                        for unit in RevisionUnit::ALL {
                            ui.selectable_value(&mut self.new_unit, unit, unit.name());
                        }
                    });
            });
            if ui.button("Add Card").clicked() {
                self.handle_create();
            }

            ui.separator();

            if let Some(message) = self.review.error.clone() {
                ui.horizontal(|ui| {
                    ui.colored_label(egui::Color32::RED, message);
                    if ui.button("Dismiss").clicked() {
                        self.review.clear_error();
                    }
                });
                ui.separator();
            }

            ui.heading(format!("Cards ({})", self.review.cards.len()));

            // We store actions to execute after UI rendering to avoid borrowing conflicts
            let mut action_flip: Option<String> = None;
            let mut action_review: Option<String> = None;
            let mut action_delete: Option<String> = None;
            let mut action_edit: Option<EditDraft> = None;

            egui::ScrollArea::vertical()
                .id_source("cards_list")
                .max_height(340.0)
                .show(ui, |ui| {
                    for card in &self.review.cards {
                        let flipped = self.review.is_flipped(&card.id);
                        ui.group(|ui| {
                            ui.label(format!("Front: {}", card.front));
                            if flipped {
                                ui.label(format!("Back: {}", card.back));
                            }

                            let mut status = card.revision.to_string();
                            if let Some(due) = ReviewModel::due_label(card, now) {
                                status = format!("{status}, {due}");
                            }
                            if card.review_count > 0 {
                                status = format!("{status}, {} reviews", card.review_count);
                            }
                            ui.small(status);

                            ui.horizontal(|ui| {
                                let flip_label = if flipped { "Hide Back" } else { "Show Back" };
                                if ui.button(flip_label).clicked() {
                                    action_flip = Some(card.id.clone());
                                }
                                if ui.button("Reviewed").clicked() {
                                    action_review = Some(card.id.clone());
                                }
                                if ui.button("Edit").clicked() {
                                    action_edit = Some(EditDraft {
                                        id: card.id.clone(),
                                        front: card.front.clone(),
                                        back: card.back.clone(),
                                    });
                                }
                                if ui.button("Delete").clicked() {
                                    action_delete = Some(card.id.clone());
                                }
                            });
                        });
                    }
                });

            // Execute deferred actions
            if let Some(id) = action_flip {
                self.review.toggle_flip(&id);
            }
            if let Some(id) = action_review {
                self.review
                    .dispatch(&self.conn, ReviewCommand::MarkReviewed { id }, now);
            }
            if let Some(id) = action_delete {
                self.review
                    .dispatch(&self.conn, ReviewCommand::Delete { id }, now);
            }
            if let Some(draft) = action_edit {
                self.editing = Some(draft);
            }
        });
    }

    /// Renders the quiz screen: countdown, answer entry, verdict reveal and
    /// the final summary.
    fn render_quiz_screen(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            let mut action_submit = false;
            let mut action_restart = false;
            let mut action_close = false;

            if let Some(session) = &self.quiz {
                ui.heading("Rapid Fire");
                ui.separator();

                if session.no_cards() {
                    ui.label("No cards to quiz. Add some cards first.");
                    ui.add_space(10.0);
                    if ui.button("Back").clicked() {
                        action_close = true;
                    }
                } else if let Some(summary) = session.summary() {
                    ui.heading("Quiz complete!");
                    ui.label(format!("Score: {} / {}", summary.correct, summary.total));
                    ui.label(format!("Accuracy: {}%", summary.accuracy));
                    ui.label(format!("Time: {}s", summary.elapsed_ms / 1000));
                    ui.add_space(10.0);
                    ui.horizontal(|ui| {
                        if ui.button("Restart").clicked() {
                            action_restart = true;
                        }
                        if ui.button("Close").clicked() {
                            action_close = true;
                        }
                    });
                } else if let Some(card) = session.current() {
                    let (question, total) = session.progress().unwrap_or((0, 0));
                    ui.label(format!(
                        "Question {question} of {total}  |  Score: {}",
                        session.correct_count()
                    ));
                    if let Some(seconds) = session.countdown() {
                        ui.label(format!("Time left: {seconds}s"));
                    }

                    ui.add_space(10.0);
                    ui.group(|ui| {
                        ui.set_min_height(120.0);
                        ui.vertical_centered(|ui| {
                            ui.add_space(20.0);
                            ui.heading(&card.front);
                            ui.add_space(20.0);
                        });
                    });
                    ui.add_space(10.0);

                    match session.verdict() {
                        Some(Verdict::Correct) => {
                            ui.colored_label(egui::Color32::GREEN, "Correct!");
                        }
                        Some(Verdict::Incorrect) => {
                            ui.colored_label(
                                egui::Color32::RED,
                                format!("Incorrect. The answer was: {}", card.back),
                            );
                        }
                        None => {
                            ui.horizontal(|ui| {
                                ui.label("Answer:");
                                let response = ui.text_edit_singleline(&mut self.quiz_answer);
                                if response.lost_focus()
                                    && ui.input(|i| i.key_pressed(egui::Key::Enter))
                                {
                                    action_submit = true;
                                }
                            });
                            if ui.button("Submit").clicked() {
                                action_submit = true;
                            }
                        }
                    }

                    ui.add_space(10.0);
                    if ui.button("Quit Quiz").clicked() {
                        action_close = true;
                    }
                }
            }

            // Execute deferred actions
            if action_submit {
                let answer = self.quiz_answer.clone();
                if let Some(session) = &mut self.quiz {
                    session.submit(&answer);
                }
            }
            if action_restart {
                let mut rng = rand::thread_rng();
                if let Some(session) = &mut self.quiz {
                    session.restart(&mut rng, Utc::now());
                }
                self.quiz_answer.clear();
                self.quiz_question = 0;
                self.last_tick = Instant::now();
            }
            if action_close {
                // dropping the session also drops its countdown
                self.quiz = None;
                self.current_screen = AppScreen::Review;
            }
        });
    }

    fn render_edit_dialog(&mut self, ctx: &egui::Context) {
        let mut save_edit = false;
        let mut cancel_edit = false;

        if let Some(draft) = &mut self.editing {
            egui::Window::new("Edit Card")
                .collapsible(false)
                .resizable(false)
                .show(ctx, |ui| {
                    ui.horizontal(|ui| {
                        ui.label("Front:");
                        ui.text_edit_singleline(&mut draft.front);
                    });
                    ui.horizontal(|ui| {
                        ui.label("Back:");
                        ui.text_edit_singleline(&mut draft.back);
                    });
                    ui.horizontal(|ui| {
                        if ui.button("Save").clicked() {
                            save_edit = true;
                        }
                        if ui.button("Cancel").clicked() {
                            cancel_edit = true;
                        }
                    });
                });
        }

        if save_edit {
            if let Some(draft) = self.editing.take() {
                self.review.dispatch(
                    &self.conn,
                    ReviewCommand::Update {
                        id: draft.id,
                        patch: CardPatch {
                            front: Some(draft.front),
                            back: Some(draft.back),
                            revision: None,
                        },
                    },
                    Utc::now(),
                );
            }
        }
        if cancel_edit {
            self.editing = None;
        }
    }

    fn handle_create(&mut self) {
        let interval = match self.new_interval.trim().parse::<i64>() {
            Ok(value) => value,
            Err(_) => {
                self.review.error = Some(format!("'{}' is not a number", self.new_interval));
                return;
            }
        };
        let revision = match RevisionSetting::new(interval, self.new_unit) {
            Ok(setting) => setting,
            Err(err) => {
                self.review.error = Some(err.to_string());
                return;
            }
        };

        self.review.dispatch(
            &self.conn,
            ReviewCommand::Create {
                front: self.new_front.clone(),
                back: self.new_back.clone(),
                revision,
            },
            Utc::now(),
        );
        if self.review.error.is_none() {
            self.new_front.clear();
            self.new_back.clear();
        }
    }

    /// Starts a quiz over a snapshot of the current card list.
    fn start_quiz(&mut self) {
        let mut rng = rand::thread_rng();
        self.quiz = Some(QuizSession::new(&self.review.cards, &mut rng, Utc::now()));
        self.quiz_answer.clear();
        self.quiz_question = 0;
        self.last_tick = Instant::now();
        self.current_screen = AppScreen::Quiz;
        log::info!("quiz started over {} cards", self.review.cards.len());
    }

    /// Handles card export to a JSON file.
    fn handle_export(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .set_file_name("cards.json")
            .add_filter("JSON files", &["json"])
            .save_file()
        {
            let path = path.display().to_string();
            match export_cards_to_path(&self.review.cards, &path) {
                Ok(_) => {
                    self.result_message =
                        format!("Exported {} cards to '{path}'", self.review.cards.len());
                }
                Err(e) => {
                    self.result_message = format!("Export failed: {}", e);
                }
            }
            self.show_result_dialog = true;
        }
    }

    /// Handles card import from a JSON file. Each entry goes through the
    /// store gateway, so imported cards get fresh ids under the current user.
    fn handle_import(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("JSON files", &["json"])
            .pick_file()
        {
            let path = path.display().to_string();
            match import_cards(&path) {
                Ok(card_file) => {
                    let total = card_file.cards.len();
                    let mut imported = 0;
                    for entry in card_file.cards {
                        self.review.dispatch(
                            &self.conn,
                            ReviewCommand::Create {
                                front: entry.front,
                                back: entry.back,
                                revision: entry.revision_settings,
                            },
                            Utc::now(),
                        );
                        if self.review.error.is_none() {
                            imported += 1;
                        }
                    }
                    self.result_message = format!("Imported {imported} of {total} cards");
                }
                Err(e) => {
                    self.result_message = format!(
                        "Import failed: {}\n\nPlease check if the file has correct structure:\n{{\n  \"cards\": [...]\n}}",
                        e
                    );
                }
            }
            self.show_result_dialog = true;
        }
    }
}
