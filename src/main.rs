use swell::prelude::*;

fn main() {
    let wave = WaveSettings::default();
    let particles = ParticleSettings {
        count: 400,
        ..Default::default()
    };

    let app = match App::new(wave, particles, 42) {
        Ok(app) => app,
        Err(e) => {
            eprintln!("Setup failed: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = app.run() {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
