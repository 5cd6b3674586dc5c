//! Vocal Lab - vocal isolation mockup

use vocal_lab::ui::VocalLabApp;

fn main() -> iced::Result {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    log::info!("vocal-lab starting up");

    iced::application(VocalLabApp::new, VocalLabApp::update, VocalLabApp::view)
        .title(VocalLabApp::title)
        .subscription(VocalLabApp::subscription)
        .theme(VocalLabApp::theme)
        .window_size(iced::Size::new(1100.0, 760.0))
        .run()
}
