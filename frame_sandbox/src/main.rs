//! Frame sandbox
//!
//! Headless run through the body engine: places model bodies in a small
//! frame tree, moves them between frames and partitions, collides, draws
//! through a recording renderer and round-trips a save.
//!
//! Usage: `frame_sandbox [config.toml|config.ron]`

use std::sync::Arc;

use body_engine::foundation::logging;
use body_engine::prelude::*;
use nalgebra::Rotation3;

struct Sandbox {
    models: ModelCache,
    frames: FrameTree,
    orbit: FrameId,
    surface: FrameId,
    bodies: Vec<ModelBody>,
}

impl Sandbox {
    fn new(config: &EngineConfig) -> Result<Self, BodyError> {
        let mut models = ModelCache::new();
        models.insert(Arc::new(MeshModel::cube("probe", 1.0)));
        models.insert(Arc::new(
            MeshModel::cube("ship.craft", 12.0).with_animation("landing_gear", 3.0),
        ));
        models.insert(Arc::new(MeshModel::cube("station", 400.0).with_clip_radius(2_000.0)));
        log::info!("Model cache holds {} models", models.len());

        let mut frames = FrameTree::new("system", config.collision.clone());
        let planet = frames.create_frame(frames.root(), "planet")?;
        let orbit = frames.create_frame(planet, "orbit")?;
        let surface = frames.create_frame(planet, "surface")?;

        Ok(Self {
            models,
            frames,
            orbit,
            surface,
            bodies: Vec::new(),
        })
    }

    fn spawn(&mut self, label: &str, model: &str, frame: FrameId, position: Vec3d) -> Result<usize, BodyError> {
        let mut body = ModelBody::new(label);
        body.set_model(&self.models, &mut self.frames, model)?;
        body.set_frame(&mut self.frames, Some(frame))?;
        body.set_position(&mut self.frames, position)?;
        body.update_interp_transform(1.0);
        log::info!(
            "Spawned '{}' ({}) radius {:.2}, clip {:.2}",
            label,
            body.id(),
            body.phys_radius(),
            body.clip_radius()
        );
        self.bodies.push(body);
        Ok(self.bodies.len() - 1)
    }

    fn collide(&mut self) -> usize {
        let mut count = 0;
        self.frames.collide_all(|frame, contact| {
            count += 1;
            log::info!(
                "Contact in {:?}: {:?} / {:?} depth {:.3}",
                frame,
                contact.body_a,
                contact.body_b,
                contact.depth
            );
        });
        count
    }

    fn render(&self, camera: &Vec3d) -> Result<usize, BodyError> {
        let mut renderer = RecordingRenderer::new();
        let view_transform = Mat4d::new_translation(&-camera);
        for body in &self.bodies {
            let view_coords = body.body().interp_position() - camera;
            body.render_model(&mut renderer, &view_coords, &view_transform)?;
        }
        let commands = renderer.drain();
        for command in &commands {
            log::debug!(
                "Draw {} triangles at ({:.2}, {:.2}, {:.2})",
                command.triangle_count,
                command.transform[(0, 3)],
                command.transform[(1, 3)],
                command.transform[(2, 3)]
            );
        }
        Ok(commands.len())
    }

    fn run(&mut self) -> Result<(), BodyError> {
        let far = Vec3d::new(1.5e11, 0.0, 0.0);

        let station = self.spawn("station", "station", self.orbit, far)?;
        let ship = self.spawn("ship", "ship.craft", self.orbit, far + Vec3d::new(900.0, 0.0, 0.0))?;
        self.spawn("probe", "probe", self.surface, Vec3d::new(0.0, 6.4e6, 0.0))?;

        self.bodies[station].set_static(&mut self.frames, true)?;
        log::info!("{} contacts before approach", self.collide());

        // Ship drifts into the station over a few steps
        for step in 0..4 {
            let body = &mut self.bodies[ship];
            body.begin_step();
            let position = body.position() - Vec3d::new(150.0, 0.0, 0.0);
            body.set_position(&mut self.frames, position)?;
            body.set_orient(*Rotation3::from_axis_angle(&Vec3d::y_axis(), 0.1 * f64::from(step)).matrix());
            body.update_interp_transform(0.5);
            if let Some(model) = body.model_mut() {
                model.advance(0.25);
            }
            log::info!("Step {}: {} contacts", step, self.collide());
        }

        self.bodies[ship].set_colliding(false);
        log::info!("{} contacts with ship disabled", self.collide());

        let drawn = self.render(&(far + Vec3d::new(0.0, 0.0, 5_000.0)))?;
        log::info!("Rendered {} bodies", drawn);

        let mut writer = Writer::new();
        self.bodies[ship].save(&mut writer, &self.frames)?;
        let bytes = writer.into_bytes();
        log::info!("Saved ship in {} bytes", bytes.len());

        let mut restored = ModelBody::new("restored");
        restored.load(&mut Reader::new(&bytes), &self.models, &mut self.frames)?;
        log::info!(
            "Restored '{}' model '{}' static {} colliding {} radius {:.2}",
            restored.body().label(),
            restored.model_name(),
            restored.is_static(),
            restored.is_colliding(),
            restored.phys_radius()
        );
        if let Some(progress) = restored.model().and_then(|m| m.animation_progress("landing_gear")) {
            log::info!("Restored landing gear progress {:.2}", progress);
        }
        restored.destroy(&mut self.frames)?;

        for body in self.bodies.drain(..) {
            body.destroy(&mut self.frames)?;
        }
        Ok(())
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init();

    let config = match std::env::args().nth(1) {
        Some(path) => {
            log::info!("Loading config from {}", path);
            EngineConfig::load_from_file(&path)?
        }
        None => EngineConfig::default(),
    };

    let mut sandbox = Sandbox::new(&config)?;
    sandbox.run()?;
    log::info!("Sandbox finished");
    Ok(())
}
