use crate::camera::{Camera, CameraUniform, OrbitController, Viewport};
use crate::config::RunConfig;
use crate::dispatch::{ChangeDispatcher, Dispatched, Regeneration};
use crate::points::HeadlessScene;
use crate::render::{create_depth_view, GpuScene};
use crate::ui::{PanelInput, ParamPanel};
use crate::{CameraParams, GalaxyError, GalaxyResult};
use rand::{rngs::SmallRng, SeedableRng};
use std::sync::Arc;
use wgpu::util::DeviceExt;
use winit::event::ElementState;
use winit::keyboard::*;
use winit::{
  dpi::PhysicalSize,
  event::{Event, KeyEvent, StartCause, WindowEvent},
  event_loop::{EventLoop, EventLoopWindowTarget},
  window::Window,
};

struct EventLoopWrapper {
  event_loop: EventLoop<()>,
  window: Arc<Window>,
}

impl EventLoopWrapper {
  pub fn new(title: &str) -> GalaxyResult<Self> {
    let event_loop = EventLoop::new()?;
    let mut builder = winit::window::WindowBuilder::new();
    builder = builder.with_title(title).with_resizable(true);
    let window = Arc::new(builder.build(&event_loop)?);

    Ok(Self { event_loop, window })
  }
}

struct SurfaceWrapper {
  surface: wgpu::Surface<'static>,
  config: wgpu::SurfaceConfiguration,
}

impl SurfaceWrapper {
  fn new(
    surface: wgpu::Surface<'static>,
    adapter: &wgpu::Adapter,
    device: &wgpu::Device,
    (width, height): (u32, u32),
  ) -> GalaxyResult<Self> {
    let mut config = surface
      .get_default_config(adapter, width, height)
      .ok_or(GalaxyError::UnsupportedSurface)?;
    let view_format = config.format.add_srgb_suffix();
    config.view_formats.push(view_format);
    surface.configure(device, &config);
    Ok(Self { surface, config })
  }

  fn resize(&mut self, device: &wgpu::Device, (width, height): (u32, u32)) {
    self.config.width = width;
    self.config.height = height;
    self.surface.configure(device, &self.config);
  }

  /// Next frame to draw into, `None` when this frame should be skipped.
  fn acquire(&mut self, device: &wgpu::Device) -> Option<wgpu::SurfaceTexture> {
    match self.surface.get_current_texture() {
      Ok(frame) => Some(frame),
      Err(wgpu::SurfaceError::Timeout) => None,
      Err(wgpu::SurfaceError::Outdated | wgpu::SurfaceError::Lost) => {
        self.surface.configure(device, &self.config);
        None
      }
      Err(err) => {
        log::error!("failed to acquire frame: {err}");
        None
      }
    }
  }

  fn view_format(&self) -> wgpu::TextureFormat {
    self.config.view_formats[0]
  }
}

struct State {
  window: Arc<Window>,
  device: Arc<wgpu::Device>,
  queue: wgpu::Queue,
  surface: SurfaceWrapper,
  depth_view: wgpu::TextureView,
  viewport: Viewport,
  camera: Camera,
  camera_uniform: CameraUniform,
  camera_buffer: wgpu::Buffer,
  camera_bind_group: wgpu::BindGroup,
  camera_controller: OrbitController,
  galaxy: ChangeDispatcher<GpuScene, SmallRng>,
  panel: ParamPanel,
}

impl State {
  /// Returns true when the event was consumed by the parameter panel or the controls.
  fn input(&mut self, event: &WindowEvent) -> bool {
    match self.panel.process_events(event, self.galaxy.parameters()) {
      PanelInput::Edit(edit) => {
        // a rejected commit has already been logged and leaves the galaxy as it was
        let _ = self.galaxy.dispatch(edit);
        self.refresh_title();
        true
      }
      PanelInput::Handled => {
        self.refresh_title();
        true
      }
      PanelInput::Ignored => self.camera_controller.process_events(event),
    }
  }

  fn refresh_title(&self) {
    self
      .window
      .set_title(&self.panel.status(self.galaxy.parameters()));
  }

  fn update(&mut self) {
    self.camera_controller.update_camera(&mut self.camera);
    self.camera_uniform.update(&self.camera, &self.viewport);
    self.queue.write_buffer(
      &self.camera_buffer,
      0,
      bytemuck::cast_slice(&[self.camera_uniform]),
    );
  }

  fn resize(&mut self, size: PhysicalSize<u32>) {
    let scale_factor = self.window.scale_factor();
    let logical = size.to_logical::<f64>(scale_factor);
    self
      .viewport
      .resize(logical.width, logical.height, scale_factor, &mut self.camera);
    self
      .camera_controller
      .set_viewport_height(logical.height as f32);
    let surface_size = self.viewport.surface_size();
    self.surface.resize(&self.device, surface_size);
    self.depth_view = create_depth_view(&self.device, surface_size);
  }

  fn render(&mut self) {
    let Some(frame) = self.surface.acquire(&self.device) else {
      return;
    };
    let view = frame.texture.create_view(&wgpu::TextureViewDescriptor {
      format: Some(self.surface.view_format()),
      ..wgpu::TextureViewDescriptor::default()
    });
    self.galaxy.scene().render(
      &view,
      &self.depth_view,
      &self.queue,
      &self.camera_bind_group,
    );
    frame.present();
  }

  async fn init(window: Arc<Window>, config: &RunConfig) -> GalaxyResult<Self> {
    let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
      #[cfg(not(target_arch = "wasm32"))]
      backends: wgpu::Backends::PRIMARY,
      ..Default::default()
    });
    let surface = instance.create_surface(window.clone())?;

    let adapter = instance
      .request_adapter(&wgpu::RequestAdapterOptions {
        power_preference: wgpu::PowerPreference::default(),
        compatible_surface: Some(&surface),
        force_fallback_adapter: false,
      })
      .await
      .ok_or(GalaxyError::NoAdapter)?;

    let (device, queue) = adapter
      .request_device(
        &wgpu::DeviceDescriptor {
          label: None,
          required_features: wgpu::Features::empty(),
          required_limits: wgpu::Limits::default(),
          memory_hints: Default::default(),
        },
        None,
      )
      .await?;
    let device = Arc::new(device);
    log::info!("using adapter {:?}", adapter.get_info().name);

    let viewport = Viewport::from_physical(window.inner_size(), window.scale_factor());
    let surface = SurfaceWrapper::new(surface, &adapter, &device, viewport.surface_size())?;
    let depth_view = create_depth_view(&device, viewport.surface_size());

    let camera_params = CameraParams::default();
    let camera = Camera::new(&camera_params, viewport.aspect());
    let mut camera_controller = OrbitController::init(&camera_params, camera.zfar);
    camera_controller.set_viewport_height(viewport.height as f32);
    let mut camera_uniform = CameraUniform::new();
    camera_uniform.update(&camera, &viewport);

    let scene = GpuScene::init(device.clone(), surface.view_format());
    let camera_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
      label: Some("Camera Buffer"),
      contents: bytemuck::cast_slice(&[camera_uniform]),
      usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
    });
    let camera_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
      layout: scene.camera_bind_group_layout(),
      entries: &[wgpu::BindGroupEntry {
        binding: 0,
        resource: camera_buffer.as_entire_binding(),
      }],
      label: Some("camera_bind_group"),
    });

    let (galaxy, _) = ChangeDispatcher::new(config.params, scene, rng(config.seed))?;

    let state = Self {
      window,
      device,
      queue,
      surface,
      depth_view,
      viewport,
      camera,
      camera_uniform,
      camera_buffer,
      camera_bind_group,
      camera_controller,
      galaxy,
      panel: ParamPanel::new(),
    };
    state.refresh_title();
    Ok(state)
  }
}

fn rng(seed: Option<u64>) -> SmallRng {
  match seed {
    Some(seed) => SmallRng::seed_from_u64(seed),
    None => SmallRng::from_entropy(),
  }
}

fn is_escape(event: &WindowEvent) -> bool {
  matches!(
    event,
    WindowEvent::KeyboardInput {
      event:
        KeyEvent {
          state: ElementState::Pressed,
          physical_key: PhysicalKey::Code(KeyCode::Escape),
          ..
        },
      ..
    }
  )
}

async fn start(config: RunConfig) -> GalaxyResult<()> {
  let window_loop = EventLoopWrapper::new("Galaxy")?;
  let mut context = State::init(window_loop.window.clone(), &config).await?;
  let window = window_loop.window;

  window_loop.event_loop.run(
    move |event, target: &EventLoopWindowTarget<()>| match event {
      Event::NewEvents(StartCause::Init) => {
        window.request_redraw();
      }
      Event::WindowEvent { event, window_id } if window_id == window.id() => {
        if !context.input(&event) {
          match event {
            WindowEvent::CloseRequested => target.exit(),
            ref e if is_escape(e) => target.exit(),
            WindowEvent::Resized(size) => context.resize(size),
            WindowEvent::RedrawRequested => {
              window.request_redraw();
              context.update();
              context.render();
            }
            _ => {}
          }
        }
      }
      _ => {}
    },
  )?;
  Ok(())
}

fn run_headless(config: RunConfig) -> GalaxyResult<()> {
  let (mut galaxy, first) =
    ChangeDispatcher::new(config.params, HeadlessScene::new(), rng(config.seed))?;
  report(&first, galaxy.scene());

  for edit in config.commits {
    // rejected commits are logged by the dispatcher and keep the previous galaxy
    if let Ok(Dispatched::Regenerated(regeneration)) = galaxy.dispatch(edit) {
      report(&regeneration, galaxy.scene());
    }
  }
  Ok(())
}

fn report(regeneration: &Regeneration, scene: &HeadlessScene) {
  if let Some((min, max)) = regeneration.bounds {
    log::info!(
      "extent x [{:.3}, {:.3}] y [{:.3}, {:.3}] z [{:.3}, {:.3}]",
      min[0],
      max[0],
      min[1],
      max[1],
      min[2],
      max[2]
    );
  }
  log::info!(
    "scene: {} attached, {} live geometries, {} live materials, {} released",
    scene.attached_count(),
    scene.live_geometries(),
    scene.live_materials(),
    scene.released()
  );
}

pub fn run(config: RunConfig) -> GalaxyResult<()> {
  if config.headless {
    run_headless(config)
  } else {
    pollster::block_on(start(config))
  }
}
