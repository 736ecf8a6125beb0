// Copyright @yucwang 2021

use crate::core::integrator::Integrator;
use crate::core::sampler::{IndependentSampler, Sampler};
use crate::core::scene::Scene;
use crate::core::sensor::Sensor;
use crate::math::bitmap::Bitmap;
use crate::math::constants::{Float, Vector2f};
use crate::math::spectrum::RGBSpectrum;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Instant;

pub use super::renderer::Renderer;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct RenderSettings {
    pub spp: u32,
    pub seed: u64,
    pub block_size: usize,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self { spp: 16, seed: 0, block_size: 32 }
    }
}

struct Block {
    x0: usize,
    y0: usize,
    x1: usize,
    y1: usize,
    pixels: Vec<RGBSpectrum>,
}

pub struct SimpleRenderer {
    integrator: Box<dyn Integrator>,
    settings: RenderSettings,
    cancel: Option<Arc<AtomicBool>>,
    show_progress: bool,
}

impl SimpleRenderer {
    pub fn new(integrator: Box<dyn Integrator>, settings: RenderSettings) -> Self {
        Self { integrator, settings, cancel: None, show_progress: true }
    }

    /// Workers stop taking samples once `flag` is set.
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    fn cancelled(&self) -> bool {
        self.cancel.as_ref().map_or(false, |flag| flag.load(Ordering::Relaxed))
    }

    // Average of the samples taken before cancellation; non-finite
    // estimates count as black.
    fn render_pixel(&self, scene: &Scene, sensor: &dyn Sensor, x: usize, y: usize,
                    width: usize, height: usize, spp: u32) -> RGBSpectrum {
        let mut sampler = IndependentSampler::for_pixel(self.settings.seed, x as u32, y as u32);
        let mut color = RGBSpectrum::default();
        let mut taken = 0u32;
        for _ in 0..spp {
            if self.cancelled() {
                break;
            }
            let jitter = sampler.next_2d();
            let film = Vector2f::new((x as Float + jitter.x) / width as Float,
                                     (y as Float + jitter.y) / height as Float);
            let ray = sensor.sample_ray(&film).with_time(sampler.next_1d());
            let value = self.integrator.li(scene, &mut sampler, &ray);
            if value.is_finite() {
                color += value;
            }
            taken += 1;
        }
        if taken == 0 {
            return RGBSpectrum::default();
        }
        color / taken as Float
    }
}

impl Renderer for SimpleRenderer {
    fn render(&self, scene: &Scene, sensor: &dyn Sensor) -> Bitmap {
        let (width, height) = sensor.resolution();
        if width == 0 || height == 0 {
            return Bitmap::new(0, 0);
        }
        let spp = self.settings.spp.max(1);

        let block_size = self.settings.block_size.max(1);
        let blocks_x = (width + block_size - 1) / block_size;
        let blocks_y = (height + block_size - 1) / block_size;
        let total_blocks = blocks_x * blocks_y;

        log::info!("Rendering {}x{} at {} spp with {} ({} blocks)",
                   width, height, spp, self.integrator.name(), total_blocks);
        let start = Instant::now();

        let progress = if self.show_progress {
            ProgressBar::new(total_blocks as u64)
        } else {
            ProgressBar::hidden()
        };
        progress.set_style(
            ProgressStyle::with_template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} blocks")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );

        let next_block = Arc::new(AtomicUsize::new(0));
        let thread_count = thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        let (tx, rx) = mpsc::channel::<Block>();
        let mut output = Bitmap::new(width, height);

        thread::scope(|scope| {
            for _ in 0..thread_count {
                let next_block = Arc::clone(&next_block);
                let tx = tx.clone();
                scope.spawn(move || {
                    loop {
                        let block_index = next_block.fetch_add(1, Ordering::Relaxed);
                        if block_index >= total_blocks {
                            break;
                        }

                        let bx = block_index % blocks_x;
                        let by = block_index / blocks_x;
                        let x0 = bx * block_size;
                        let y0 = by * block_size;
                        let x1 = (x0 + block_size).min(width);
                        let y1 = (y0 + block_size).min(height);

                        let mut pixels = Vec::with_capacity((x1 - x0) * (y1 - y0));
                        for y in y0..y1 {
                            for x in x0..x1 {
                                pixels.push(self.render_pixel(scene, sensor, x, y, width, height, spp));
                            }
                        }
                        if tx.send(Block { x0, y0, x1, y1, pixels }).is_err() {
                            break;
                        }
                    }
                });
            }

            drop(tx);
            for block in rx.iter() {
                let block_width = block.x1 - block.x0;
                for y in block.y0..block.y1 {
                    for x in block.x0..block.x1 {
                        output[(x, y)] = block.pixels[(x - block.x0) + block_width * (y - block.y0)];
                    }
                }
                progress.inc(1);
            }
        });
        progress.finish_and_clear();

        if self.cancelled() {
            log::warn!("Render cancelled after {:.2?}; unfinished pixels keep partial averages", start.elapsed());
        } else {
            log::info!("Render finished in {:.2?}", start.elapsed());
        }
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emitters::distant_sphere::DistantSphereLight;
    use crate::emitters::Light;
    use crate::integrators::{IntegratorKind, PathConfig};
    use crate::math::constants::Vector3f;
    use crate::sensors::perspective::PerspectiveCamera;

    fn camera(width: usize, height: usize) -> PerspectiveCamera {
        PerspectiveCamera::new(Vector3f::zeros(), Vector3f::new(0.0, 0.0, -1.0), Vector3f::new(0.0, 1.0, 0.0),
                               std::f32::consts::FRAC_PI_3, width, height)
    }

    fn sky() -> Scene {
        let mut scene = Scene::new();
        let env = DistantSphereLight::environment(RGBSpectrum::new(0.5, 0.25, 1.0));
        scene.add_emitter(Light::DistantSphere(env)).unwrap();
        scene
    }

    fn renderer(settings: RenderSettings) -> SimpleRenderer {
        SimpleRenderer::new(IntegratorKind::PathMis.build(PathConfig::default()), settings).with_progress(false)
    }

    #[test]
    fn test_render_fills_every_tile() {
        let scene = sky();
        // Block size that does not divide the image.
        let settings = RenderSettings { spp: 2, seed: 3, block_size: 3 };
        let image = renderer(settings).render(&scene, &camera(7, 5));
        assert_eq!((image.width(), image.height()), (7, 5));
        for y in 0..5 {
            for x in 0..7 {
                assert_eq!(image[(x, y)], RGBSpectrum::new(0.5, 0.25, 1.0));
            }
        }
    }

    #[test]
    fn test_render_is_deterministic_per_seed() {
        let mut scene = sky();
        let shape = std::sync::Arc::new(crate::shapes::sphere::Sphere::new(Vector3f::new(0.0, 0.0, -3.0), 1.0));
        scene.add_object(crate::core::scene::SceneObject::new(shape, crate::materials::Material::default()));
        let settings = RenderSettings { spp: 4, seed: 11, block_size: 4 };
        let a = renderer(settings).render(&scene, &camera(6, 6));
        let b = renderer(settings).render(&scene, &camera(6, 6));
        assert_eq!(a.raw_copy(), b.raw_copy());
    }

    #[test]
    fn test_cancelled_render_is_black() {
        let scene = sky();
        let flag = Arc::new(AtomicBool::new(true));
        let image = renderer(RenderSettings::default()).with_cancel_flag(flag).render(&scene, &camera(4, 4));
        assert!(image.mean().is_black());
    }
}
