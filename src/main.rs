//! Maze Tag entry point
//!
//! Wires the terminal matrix, logged audio and the demo joystick into a
//! device, then runs games forever in the configured mode.

#[cfg(not(target_arch = "wasm32"))]
fn main() -> anyhow::Result<()> {
    use anyhow::Context;
    use maze_tag::audio::{AudioManager, LogAudio};
    use maze_tag::net::UdpTransport;
    use maze_tag::platform::{DemoJoystick, SystemClock};
    use maze_tag::renderer::TerminalDisplay;
    use maze_tag::session::{Console, HostDevice, PeerDevice};
    use maze_tag::{PlayMode, Settings};

    env_logger::init();
    let settings = Settings::load();
    log::info!("Maze Tag starting in {} mode", settings.mode.as_str());

    let seed = settings.seed.unwrap_or_else(rand::random);
    let console = Console::new(
        TerminalDisplay::stdout(),
        AudioManager::new(LogAudio::default(), settings.volume),
        DemoJoystick::new(
            seed,
            settings.joystick.center_x,
            settings.joystick.center_y,
        ),
        SystemClock::new(),
    );

    match settings.mode {
        PlayMode::Standalone => {
            HostDevice::<_, _, _, _, UdpTransport>::new(console, &settings, None).run()
        }
        PlayMode::Host | PlayMode::Peer => {
            let peer_addr = settings.network.peer_socket_addr()?;
            let transport = UdpTransport::bind(settings.network.bind_addr.as_str(), peer_addr)
                .with_context(|| format!("binding {}", settings.network.bind_addr))?;
            log::info!("Linked to {}", peer_addr);
            if settings.mode == PlayMode::Host {
                HostDevice::new(console, &settings, Some(transport)).run()
            } else {
                PeerDevice::new(console, &settings, transport).run()
            }
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {}
