mod app;
use rapidcards_app::*;

use app::StudyApp;
use chrono::Utc;
use database::db;
use models::ReviewModel;
use models::schedule::RevisionSetting;

fn main() -> eframe::Result<()> {
    env_logger::init();

    let conn = db::init_store("cards.sqlite3").expect("Failed to open card store");
    let profile = db::get_or_create_profile(&conn).expect("Failed to load profile");

    if db::list_cards(&conn, &profile.uid)
        .unwrap_or_default()
        .is_empty()
    {
        let samples = [
            ("Capital of France", "Paris"),
            ("Capital of Poland", "Warsaw"),
            ("Capital of Japan", "Tokyo"),
        ];
        for (front, back) in samples {
            let _ = db::create_card(
                &conn,
                &profile.uid,
                front,
                back,
                RevisionSetting::default(),
                Utc::now(),
            );
        }
        log::info!("sample cards created");
    }

    let review = ReviewModel::load(&conn, profile.uid.clone()).expect("Failed to load cards");
    log::info!(
        "loaded {} cards for {}",
        review.cards.len(),
        profile.display_name
    );

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([520.0, 720.0]),
        ..Default::default()
    };
    eframe::run_native(
        "Rapid Cards",
        options,
        Box::new(|_cc| Ok(Box::new(StudyApp::new(conn, profile, review)))),
    )
}
