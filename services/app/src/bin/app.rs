//! services/app/src/bin/app.rs

use app_lib::{
    adapters::{FileCredentialStore, HeadlessShell, PortalDirectory, WatermarkGuard},
    config::Config,
    controller::{AppController, AppEvent, CatalogView, Flow},
    error::AppError,
    ui,
};
use chrono::Local;
use lms_core::access::LoginInput;
use lms_core::catalog;
use lms_core::navigation::Screen;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Config::from_env()?;
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting LMS client...");

    // --- 2. Wire the Adapters ---
    let directory = Arc::new(PortalDirectory::new(
        &config.portal_url,
        config.api_key.clone(),
        config.api_secret.clone(),
        config.http_timeout,
    )?);
    let store = Arc::new(FileCredentialStore::new(config.credential_store_path.clone()));
    let protection = Arc::new(WatermarkGuard::new());
    let shell = Arc::new(HeadlessShell::new());

    // --- 3. Launch: restore the cached session if it still validates ---
    let mut controller = AppController::new(directory, store, protection, shell);
    controller.launch().await;
    render(&mut controller);

    // --- 4. Drive the controller from stdin events ---
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == "quit" {
            break;
        }
        let Some(event) = parse_command(line) else {
            print_help();
            continue;
        };
        if controller.handle(event).await == Flow::Exit {
            break;
        }
        render(&mut controller);
    }
    info!("Shutting down.");
    Ok(())
}

fn parse_command(line: &str) -> Option<AppEvent> {
    let mut parts = line.split_whitespace();
    let command = parts.next()?;
    match command {
        "login" => {
            let email = parts.next()?.to_string();
            let password = parts.next()?.to_string();
            let private_key = parts.next()?.to_string();
            Some(AppEvent::SubmitLogin(LoginInput {
                email,
                password,
                private_key,
            }))
        }
        "open" => {
            let n = parts.next()?.parse::<usize>().ok()?;
            Some(AppEvent::SelectCourse(n.checked_sub(1)?))
        }
        "play" => {
            let n = parts.next()?.parse::<usize>().ok()?;
            Some(AppEvent::SelectVideo(n.checked_sub(1)?))
        }
        "live" => Some(AppEvent::OpenLiveClass),
        "close" => Some(AppEvent::CloseLiveClass),
        "fs" => Some(AppEvent::ToggleFullscreen),
        "back" => Some(AppEvent::Back),
        "logout" => Some(AppEvent::Logout),
        "bg" => Some(AppEvent::AppStateChange { is_active: false }),
        "fg" => Some(AppEvent::AppStateChange { is_active: true }),
        _ => None,
    }
}

fn print_help() {
    println!("commands:");
    println!("  login <email> <password> <private-key>");
    println!("  open <n>    select course n");
    println!("  play <n>    play video n");
    println!("  live / close  open or close the live class modal");
    println!("  fs          toggle fullscreen");
    println!("  back        hardware back button");
    println!("  bg / fg     background or foreground the app");
    println!("  logout / quit");
}

fn render(controller: &mut AppController) {
    if let Some(notice) = controller.take_notice() {
        println!("! {notice}");
    }

    match controller.screen() {
        Screen::Loading => println!("[loading]"),
        Screen::LoggedOut => {
            println!("[login] enter: login <email> <password> <private-key>");
        }
        Screen::CourseList => render_course_list(controller),
        Screen::VideoList => render_video_list(controller),
        Screen::VideoPlaying => render_player(controller),
    }
}

fn render_course_list(controller: &AppController) {
    if let Some(student) = controller.student() {
        println!(
            "[courses] {} ({})",
            student.display_name(),
            ui::initials(&student.first_name, student.last_name.as_deref())
        );
    }
    match controller.catalog_view() {
        CatalogView::NotLoaded => println!("  (not loaded)"),
        CatalogView::Empty => {
            println!("  No Courses Assigned");
            println!("  You do not have access to any courses yet. Please contact your administrator.");
        }
        CatalogView::AllExpired => {
            println!("  No Active Courses");
            println!("  All your courses have expired. Please contact your administrator.");
        }
        CatalogView::LoadFailed => {
            println!("  Error Loading Courses");
            println!("  Unable to load your courses. Please check your internet connection.");
        }
        CatalogView::Courses => {
            let today = Local::now().date_naive();
            for (i, entry) in controller.entries().iter().enumerate() {
                let status = catalog::expiry_status(entry.expiry, today);
                let soon = if catalog::expiring_soon(entry.expiry, today) {
                    "  [EXPIRING SOON]"
                } else {
                    ""
                };
                println!(
                    "  {}. {} ({}){}",
                    i + 1,
                    entry.course.title,
                    ui::expiry_label(status),
                    soon
                );
            }
        }
    }
}

fn render_video_list(controller: &AppController) {
    println!(
        "[videos] {}",
        controller.course_title().unwrap_or("(unknown course)")
    );
    if controller.videos().is_empty() {
        println!("  No Videos Available");
        println!("  This course doesn't have any video links yet. Please contact your administrator.");
    }
    for (i, video) in controller.videos().iter().enumerate() {
        println!("  {}. {}", i + 1, video.title);
    }
    if controller.is_live_class_open() {
        println!("  [live class] {}", controller.live_class_link().unwrap_or(""));
    } else if controller.live_class_link().is_some() {
        println!("  (live class available: 'live')");
    }
}

fn render_player(controller: &AppController) {
    let position = controller
        .current_video()
        .map(|i| format!("Video {} of {}", i + 1, controller.videos().len()))
        .unwrap_or_default();
    println!(
        "[playing] {} {}",
        controller
            .current_video()
            .and_then(|i| controller.videos().get(i))
            .map(|v| v.title.as_str())
            .unwrap_or("(unknown)"),
        position
    );
    if let Some(url) = controller.current_embed_url() {
        println!("  {url}");
    }
    if controller.is_fullscreen() {
        println!("  (fullscreen)");
    }
}
