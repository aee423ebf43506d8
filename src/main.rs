use iced::widget::{button, column, container, row, scrollable, text, text_editor};
use iced::{window, Alignment, Element, Length, Subscription, Task, Theme};
use rfd::FileDialog;
use std::path::PathBuf;
use std::rc::Rc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

mod collab;
mod config;
mod error;
mod state;
mod ui;

use collab::local::LocalUploader;
use collab::route::{Route, RouteRecorder};
use collab::toast::ToastBoard;
use collab::Notifier;
use config::Settings;
use state::composer::{FitComposer, ImagePolicy, SubmissionResult, SubmitCompletion};
use state::data::{load_size_result, FitRecord, SizeResult};
use state::library::Library;
use state::upload::{CandidateFile, UploadCompletion, UploadSession};
use ui::reveal::{SizeReveal, Spring};

/// How many fits the profile screen lists
const PROFILE_LIMIT: usize = 50;
/// How often resolved toasts are checked for expiry
const TOAST_TICK: Duration = Duration::from_millis(250);

/// Main application state
struct FitApp {
    settings: Settings,
    /// The fit catalog, also the persistence collaborator
    library: Rc<Library>,
    uploader: Rc<LocalUploader>,
    toasts: Rc<ToastBoard>,
    router: Rc<RouteRecorder>,
    /// Upload lifecycle of the open form
    session: UploadSession,
    /// Tags, description and submit gate of the open form
    composer: FitComposer,
    /// Editor buffer backing the description field
    description: text_editor::Content,
    tag_input: String,
    route: Route,
    profile: Vec<FitRecord>,
    result: Option<SizeResult>,
    reveal: SizeReveal,
    last_frame: Option<Instant>,
}

/// Application messages (events)
#[derive(Debug, Clone)]
enum Message {
    /// User clicked "Select file"
    PickFile,
    /// Background read of the picked file finished
    FileLoaded(Result<CandidateFile, String>),
    BeginUpload,
    UploadSettled(UploadCompletion),
    /// User discarded the uploaded image
    ClearUpload,
    DescriptionEdited(text_editor::Action),
    TagInputChanged(String),
    TagSubmitted,
    TagRemoved(String),
    Submit,
    SubmitSettled(SubmitCompletion),
    Navigate(Route),
    /// User clicked "Open result…"
    OpenResult,
    ResultLoaded(Result<SizeResult, String>),
    /// Animation frame while the size reveal runs
    Frame(Instant),
    /// Toast expiry tick
    Tick(Instant),
}

impl FitApp {
    /// Create a new instance of the application
    fn new(settings: Settings, library: Library) -> (Self, Task<Message>) {
        let library = Rc::new(library);
        let uploader = Rc::new(LocalUploader::new(
            settings.media_dir(),
            settings.permitted_types.clone(),
        ));
        let toasts = Rc::new(ToastBoard::new());
        let router = Rc::new(RouteRecorder::default());

        let session = UploadSession::new(uploader.clone(), toasts.clone());
        let composer = new_composer(&settings, &library, &toasts, &router);

        match library.fit_count() {
            Ok(count) => info!(count, "fit composer initialized"),
            Err(e) => warn!(error = %e, "could not count fits"),
        }

        (
            FitApp {
                settings,
                library,
                uploader,
                toasts,
                router,
                session,
                composer,
                description: text_editor::Content::new(),
                tag_input: String::new(),
                route: Route::Create,
                profile: Vec::new(),
                result: None,
                reveal: SizeReveal::default(),
                last_frame: None,
            },
            Task::none(),
        )
    }

    /// Handle application messages and update state
    fn update(&mut self, message: Message) -> Task<Message> {
        let task = self.handle(message);

        // The composer may have asked to move elsewhere
        if let Some(route) = self.router.take() {
            self.go(route);
        }

        task
    }

    fn handle(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::PickFile => {
                let mut dialog = FileDialog::new().set_title("Select an image for your fit");
                for (name, extensions) in self.session.accept_filter().dialog_filters() {
                    dialog = dialog.add_filter(name, extensions.as_slice());
                }

                // Single selection only; the dialog never returns a batch
                match dialog.pick_file() {
                    Some(path) => Task::perform(read_candidate(path), Message::FileLoaded),
                    None => Task::none(),
                }
            }
            Message::FileLoaded(Ok(file)) => {
                if let Err(e) = self.session.select_file(file) {
                    self.toasts.failure(&e.to_string());
                }
                Task::none()
            }
            Message::FileLoaded(Err(reason)) => {
                error!(%reason, "could not read selected file");
                self.toasts.failure(&reason);
                Task::none()
            }
            Message::BeginUpload => match self.session.begin_upload() {
                Some(upload) => Task::perform(upload, Message::UploadSettled),
                None => Task::none(),
            },
            Message::UploadSettled(completion) => {
                self.session.on_upload_settled(completion);
                Task::none()
            }
            Message::ClearUpload => {
                self.session.clear_uploaded();
                Task::none()
            }
            Message::DescriptionEdited(action) => {
                self.description.perform(action);
                let text = self.description.text();
                // The editor always ends its buffer with a newline
                self.composer
                    .set_description(text.strip_suffix('\n').unwrap_or(&text));
                Task::none()
            }
            Message::TagInputChanged(value) => {
                self.tag_input = value;
                Task::none()
            }
            Message::TagSubmitted => {
                let tag = std::mem::take(&mut self.tag_input);
                self.composer.add_tag(&tag);
                Task::none()
            }
            Message::TagRemoved(tag) => {
                self.composer.remove_tag(&tag);
                Task::none()
            }
            Message::Submit => match self.composer.submit(self.session.uploaded_url()) {
                Ok(create) => Task::perform(create, Message::SubmitSettled),
                Err(e) => {
                    debug!(error = %e, "submit not started");
                    Task::none()
                }
            },
            Message::SubmitSettled(completion) => {
                self.composer.on_submit_settled(completion);
                Task::none()
            }
            Message::Navigate(route) => {
                self.go(route);
                Task::none()
            }
            Message::OpenResult => {
                let file = FileDialog::new()
                    .set_title("Open a size result")
                    .add_filter("result", &["json"])
                    .pick_file();

                match file {
                    Some(path) => Task::perform(
                        async move { load_size_result(path).await.map_err(|e| e.to_string()) },
                        Message::ResultLoaded,
                    ),
                    None => Task::none(),
                }
            }
            Message::ResultLoaded(Ok(result)) => {
                info!(image = ?result.image(), size = ?result.size(), "result loaded");
                // Showing a result is a fresh mount of the view
                let mut reveal = SizeReveal::new(Spring::default());
                reveal.observe(result.size());
                self.reveal = reveal;
                self.last_frame = None;
                self.result = Some(result);
                self.go(Route::Result);
                Task::none()
            }
            Message::ResultLoaded(Err(reason)) => {
                error!(%reason, "could not load result");
                self.toasts.failure(&format!("Failed to open result: {}", reason));
                Task::none()
            }
            Message::Frame(now) => {
                let elapsed = self
                    .last_frame
                    .map(|last| now.saturating_duration_since(last))
                    .unwrap_or(Duration::ZERO);
                self.reveal.advance(elapsed);
                self.last_frame = self.reveal.is_running().then_some(now);
                Task::none()
            }
            Message::Tick(now) => {
                self.toasts.expire(now);
                Task::none()
            }
        }
    }

    /// Switch screens
    fn go(&mut self, route: Route) {
        // A submitted form is unmounted once the user leaves it
        if self.route == Route::Create
            && route != Route::Create
            && self.composer.status() == Some(&SubmissionResult::Success)
        {
            self.remount_form();
        }

        if route == Route::Profile {
            match self.library.recent_fits(PROFILE_LIMIT) {
                Ok(fits) => self.profile = fits,
                Err(e) => {
                    error!(error = %e, "could not load fits");
                    self.toasts.failure("Failed to load your fits");
                }
            }
        }

        debug!(from = self.route.path(), to = route.path(), "route changed");
        self.route = route;
    }

    fn remount_form(&mut self) {
        self.session.abandon();
        self.session = UploadSession::new(self.uploader.clone(), self.toasts.clone());
        self.composer = new_composer(&self.settings, &self.library, &self.toasts, &self.router);
        self.description = text_editor::Content::new();
        self.tag_input.clear();
    }

    fn subscription(&self) -> Subscription<Message> {
        let mut subscriptions = Vec::new();
        if self.reveal.is_running() {
            subscriptions.push(window::frames().map(Message::Frame));
        }
        if !self.toasts.is_empty() {
            subscriptions.push(iced::time::every(TOAST_TICK).map(Message::Tick));
        }
        Subscription::batch(subscriptions)
    }

    /// Build the user interface
    fn view(&self) -> Element<Message> {
        let nav = row![
            button(text("Create")).on_press(Message::Navigate(Route::Create)),
            button(text("Profile")).on_press(Message::Navigate(Route::Profile)),
            button(text("Open result…")).on_press(Message::OpenResult),
        ]
        .spacing(10);

        let screen: Element<Message> = match self.route {
            Route::Create => ui::form::view(
                &self.session,
                &self.composer,
                &self.description,
                &self.tag_input,
            ),
            Route::Profile => ui::profile::view(&self.profile),
            Route::Result => match &self.result {
                Some(result) => ui::result::view(result, &self.reveal),
                None => text("Open a result file to see your recommended size.").into(),
            },
        };

        let content = column![
            nav,
            ui::toasts::view(self.toasts.visible()),
            scrollable(container(screen).width(Length::Fill).center_x(Length::Fill)),
        ]
        .spacing(20)
        .padding(40)
        .align_x(Alignment::Center);

        container(content)
            .width(Length::Fill)
            .height(Length::Fill)
            .center_x(Length::Fill)
            .into()
    }

    /// Set the application theme
    fn theme(&self) -> Theme {
        Theme::Dark
    }
}

fn new_composer(
    settings: &Settings,
    library: &Rc<Library>,
    toasts: &Rc<ToastBoard>,
    router: &Rc<RouteRecorder>,
) -> FitComposer {
    FitComposer::new(
        ImagePolicy::from_require_image(settings.require_image),
        settings.profile_route.clone(),
        library.clone(),
        toasts.clone(),
        router.clone(),
    )
}

/// Read a picked file into memory
async fn read_candidate(path: PathBuf) -> Result<CandidateFile, String> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .ok_or_else(|| format!("Not a file: {}", path.display()))?;
    let bytes = tokio::fs::read(&path)
        .await
        .map_err(|e| format!("Failed to read {}: {}", name, e))?;
    Ok(CandidateFile::new(name, bytes))
}

fn init_tracing(fallback: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback)),
        )
        .init();
}

fn main() -> iced::Result {
    let loaded = Settings::load();
    let settings = loaded.as_ref().cloned().unwrap_or_default();
    init_tracing(&settings.log_filter);
    if let Err(e) = &loaded {
        warn!(error = %e, "invalid settings, using defaults");
    }

    let library = match Library::open(settings.database_path()) {
        Ok(library) => library,
        Err(e) => {
            error!(error = %e, "failed to open the fit catalog");
            std::process::exit(1);
        }
    };

    iced::application("Fit Composer", FitApp::update, FitApp::view)
        .subscription(FitApp::subscription)
        .theme(FitApp::theme)
        .centered()
        .run_with(move || FitApp::new(settings, library))
}
