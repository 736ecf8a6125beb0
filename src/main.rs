// Copyright 2020 TwoCookingMice

use anyhow::Context;
use clap::Parser;
use pathweaver::core::integrator::Integrator;
use pathweaver::core::sensor::Sensor;
use pathweaver::core::texture::Texture;
use pathweaver::integrators::{IntegratorKind, RussianRoulette};
use pathweaver::io::exr_utils;
use pathweaver::renderers::simple::{RenderSettings, Renderer, SimpleRenderer};
use pathweaver::scenes::DemoScene;
use pathweaver::textures::image::ImageTexture;
use std::fmt::Display;
use std::path::Path;
use std::sync::Arc;

#[derive(Clone, Debug)]
pub struct Resolution {
    width: usize,
    height: usize,
}

impl std::str::FromStr for Resolution {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut split_it = s.split('x');
        let (Some(a), Some(b)) = (split_it.next(), split_it.next()) else {
            return Err(anyhow::anyhow!("expected `width`x`height`, got {}", s));
        };
        let width: usize = a.parse()?;
        let height: usize = b.parse()?;
        if width == 0 || height == 0 {
            return Err(anyhow::anyhow!("resolution must be non-zero, got {}", s));
        }
        Ok(Resolution { width, height })
    }
}

impl Display for Resolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_fmt(format_args!("{}x{}", self.width, self.height))
    }
}

#[derive(Parser, Debug)]
#[command(about = "Monte Carlo path tracer for the built-in demo scenes")]
pub struct Args {
    #[arg(long, value_enum, default_value_t)]
    /// Scene selector
    scene: DemoScene,

    #[arg(short, long, value_enum, default_value_t)]
    /// Radiance estimator
    integrator: IntegratorKind,

    #[arg(long = "spp", default_value_t = 16)]
    /// Samples per pixel
    samples_per_pixel: u32,

    #[arg(long)]
    /// Path depth cap, defaults to the estimator's own
    max_depth: Option<u32>,

    #[arg(long)]
    /// Disable Russian roulette
    no_roulette: bool,

    #[arg(long, default_value_t = 0)]
    seed: u64,

    #[arg(short, long, default_value = "512x512")]
    /// Image size in format `width`x`height`
    resolution: Resolution,

    #[arg(long)]
    /// Equirectangular image lighting scenes with a sky
    envmap: Option<String>,

    #[arg(short, long, default_value = "render.exr")]
    /// Output image; `.png`/`.jpg` are tone mapped, anything else is EXR
    output: String,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let environment = match &args.envmap {
        Some(path) => {
            let texture = ImageTexture::from_file(path)
                .with_context(|| format!("loading environment map {}", path))?;
            Some(Arc::new(texture) as Arc<dyn Texture>)
        }
        None => None,
    };

    let (scene, camera) = args.scene
        .build(args.resolution.width, args.resolution.height, environment)
        .context("assembling scene")?;
    log::info!("{}", camera.describe());

    let mut config = args.integrator.default_config();
    if let Some(max_depth) = args.max_depth {
        config = config.with_max_depth(max_depth);
    }
    if args.no_roulette {
        config = config.with_roulette(RussianRoulette::Disabled);
    }
    let integrator = args.integrator.build(config);
    if scene.lights().is_empty() && uses_light_sampling(integrator.as_ref()) {
        log::warn!("{} samples emitters but the scene has none", integrator.name());
    }

    let settings = RenderSettings { spp: args.samples_per_pixel, seed: args.seed, ..RenderSettings::default() };
    let renderer = SimpleRenderer::new(integrator, settings);
    let image = renderer.render(&scene, &camera);
    log::info!("Mean pixel value: {:?}", image.mean());

    let ext = Path::new(&args.output)
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();
    match ext.as_str() {
        "png" | "jpg" | "jpeg" => exr_utils::write_ldr_to_file(&image, &args.output)
            .with_context(|| format!("writing {}", args.output))?,
        _ => exr_utils::write_exr_to_file(&image, &args.output)
            .with_context(|| format!("writing {}", args.output))?,
    }
    Ok(())
}

fn uses_light_sampling(integrator: &dyn Integrator) -> bool {
    matches!(integrator.name(), "direct" | "direct_ems" | "direct_mis" | "path_nee" | "path_mis")
}
