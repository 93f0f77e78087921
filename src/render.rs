use crate::generate::ParticleBuffer;
use crate::points::{Blending, PointsMaterial, SceneBackend};
use std::borrow::Cow;
use std::sync::Arc;
use wgpu::{util::DeviceExt, PipelineCompilationOptions};

pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Vertices per point quad (two triangles)
const QUAD_VERTICES: u32 = 6;

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
struct MaterialUniform {
  size: f32,
  size_attenuation: u32,
  vertex_colors: u32,
  _pad: f32,
}

impl From<&PointsMaterial> for MaterialUniform {
  fn from(material: &PointsMaterial) -> Self {
    Self {
      size: material.size,
      size_attenuation: material.size_attenuation as u32,
      vertex_colors: material.vertex_colors as u32,
      _pad: 0.0,
    }
  }
}

/// Per-point position and color buffers
pub struct GpuGeometry {
  positions: wgpu::Buffer,
  colors: wgpu::Buffer,
  count: u32,
}

pub struct GpuMaterial {
  pipeline: wgpu::RenderPipeline,
  uniform: wgpu::Buffer,
  bind_group: wgpu::BindGroup,
}

struct PointsObject {
  id: u64,
  geometry: Arc<GpuGeometry>,
  material: Arc<GpuMaterial>,
}

/// Scene graph of point clouds drawn with wgpu
pub struct GpuScene {
  device: Arc<wgpu::Device>,
  shader: wgpu::ShaderModule,
  camera_bind_group_layout: wgpu::BindGroupLayout,
  material_bind_group_layout: wgpu::BindGroupLayout,
  pipeline_layout: wgpu::PipelineLayout,
  target_format: wgpu::TextureFormat,
  objects: Vec<PointsObject>,
  next_id: u64,
}

impl GpuScene {
  #[must_use]
  pub fn init(device: Arc<wgpu::Device>, target_format: wgpu::TextureFormat) -> Self {
    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
      label: Some("points shader"),
      source: wgpu::ShaderSource::Wgsl(Cow::Borrowed(include_str!("shaders/points.wgsl"))),
    });

    let camera_bind_group_layout =
      device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[uniform_layout_entry()],
        label: Some("camera_bind_group_layout"),
      });
    let material_bind_group_layout =
      device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[uniform_layout_entry()],
        label: Some("material_bind_group_layout"),
      });
    let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
      label: Some("points"),
      bind_group_layouts: &[&camera_bind_group_layout, &material_bind_group_layout],
      push_constant_ranges: &[],
    });

    Self {
      device,
      shader,
      camera_bind_group_layout,
      material_bind_group_layout,
      pipeline_layout,
      target_format,
      objects: Vec::new(),
      next_id: 0,
    }
  }

  pub fn camera_bind_group_layout(&self) -> &wgpu::BindGroupLayout {
    &self.camera_bind_group_layout
  }

  fn create_pipeline(&self, material: &PointsMaterial) -> wgpu::RenderPipeline {
    let positions = wgpu::VertexBufferLayout {
      array_stride: 3 * 4,
      step_mode: wgpu::VertexStepMode::Instance,
      attributes: &wgpu::vertex_attr_array![0 => Float32x3],
    };
    let colors = wgpu::VertexBufferLayout {
      array_stride: 3 * 4,
      step_mode: wgpu::VertexStepMode::Instance,
      attributes: &wgpu::vertex_attr_array![1 => Float32x3],
    };
    let blend = match material.blending {
      Blending::Additive => wgpu::BlendState {
        color: wgpu::BlendComponent {
          src_factor: wgpu::BlendFactor::SrcAlpha,
          dst_factor: wgpu::BlendFactor::One,
          operation: wgpu::BlendOperation::Add,
        },
        alpha: wgpu::BlendComponent::OVER,
      },
      Blending::Normal => wgpu::BlendState::ALPHA_BLENDING,
    };

    self
      .device
      .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("Points Pipeline"),
        layout: Some(&self.pipeline_layout),
        vertex: wgpu::VertexState {
          module: &self.shader,
          entry_point: "main_vs",
          compilation_options: PipelineCompilationOptions::default(),
          buffers: &[positions, colors],
        },
        fragment: Some(wgpu::FragmentState {
          module: &self.shader,
          entry_point: "main_fs",
          compilation_options: PipelineCompilationOptions::default(),
          targets: &[Some(wgpu::ColorTargetState {
            format: self.target_format,
            blend: Some(blend),
            write_mask: wgpu::ColorWrites::ALL,
          })],
        }),
        primitive: wgpu::PrimitiveState::default(),
        depth_stencil: Some(wgpu::DepthStencilState {
          format: DEPTH_FORMAT,
          depth_write_enabled: material.depth_write,
          depth_compare: wgpu::CompareFunction::Less,
          stencil: wgpu::StencilState::default(),
          bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
      })
  }

  pub fn render(
    &self,
    view: &wgpu::TextureView,
    depth_view: &wgpu::TextureView,
    queue: &wgpu::Queue,
    camera_bind_group: &wgpu::BindGroup,
  ) {
    let color_attachments = [Some(wgpu::RenderPassColorAttachment {
      view,
      resolve_target: None,
      ops: wgpu::Operations {
        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
        store: wgpu::StoreOp::Store,
      },
    })];
    let render_pass_descriptor = wgpu::RenderPassDescriptor {
      label: None,
      color_attachments: &color_attachments,
      depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
        view: depth_view,
        depth_ops: Some(wgpu::Operations {
          load: wgpu::LoadOp::Clear(1.0),
          store: wgpu::StoreOp::Store,
        }),
        stencil_ops: None,
      }),
      timestamp_writes: None,
      occlusion_query_set: None,
    };
    let mut command_encoder = self
      .device
      .create_command_encoder(&wgpu::CommandEncoderDescriptor { label: None });
    {
      let mut rpass = command_encoder.begin_render_pass(&render_pass_descriptor);
      for object in &self.objects {
        if object.geometry.count == 0 {
          continue;
        }
        rpass.set_pipeline(&object.material.pipeline);
        rpass.set_bind_group(0, camera_bind_group, &[]);
        rpass.set_bind_group(1, &object.material.bind_group, &[]);
        rpass.set_vertex_buffer(0, object.geometry.positions.slice(..));
        rpass.set_vertex_buffer(1, object.geometry.colors.slice(..));
        rpass.draw(0..QUAD_VERTICES, 0..object.geometry.count);
      }
    }
    queue.submit(Some(command_encoder.finish()));
  }
}

impl SceneBackend for GpuScene {
  type Geometry = Arc<GpuGeometry>;
  type Material = Arc<GpuMaterial>;
  type Object = u64;

  fn create_geometry(&mut self, buffer: &ParticleBuffer) -> Arc<GpuGeometry> {
    let vertex_buffer = |label: &str, contents: &[f32]| {
      self
        .device
        .create_buffer_init(&wgpu::util::BufferInitDescriptor {
          label: Some(label),
          contents: bytemuck::cast_slice(contents),
          usage: wgpu::BufferUsages::VERTEX,
        })
    };
    Arc::new(GpuGeometry {
      positions: vertex_buffer("Galaxy Positions", &buffer.positions),
      colors: vertex_buffer("Galaxy Colors", &buffer.colors),
      count: buffer.len() as u32,
    })
  }

  fn create_material(&mut self, material: &PointsMaterial) -> Arc<GpuMaterial> {
    let uniform = self
      .device
      .create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("Points Material"),
        contents: bytemuck::bytes_of(&MaterialUniform::from(material)),
        usage: wgpu::BufferUsages::UNIFORM,
      });
    let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
      layout: &self.material_bind_group_layout,
      entries: &[wgpu::BindGroupEntry {
        binding: 0,
        resource: uniform.as_entire_binding(),
      }],
      label: Some("material_bind_group"),
    });
    Arc::new(GpuMaterial {
      pipeline: self.create_pipeline(material),
      uniform,
      bind_group,
    })
  }

  fn release_geometry(&mut self, geometry: &Arc<GpuGeometry>) {
    geometry.positions.destroy();
    geometry.colors.destroy();
  }

  fn release_material(&mut self, material: &Arc<GpuMaterial>) {
    material.uniform.destroy();
  }

  fn add_points(&mut self, geometry: &Arc<GpuGeometry>, material: &Arc<GpuMaterial>) -> u64 {
    self.next_id += 1;
    self.objects.push(PointsObject {
      id: self.next_id,
      geometry: Arc::clone(geometry),
      material: Arc::clone(material),
    });
    self.next_id
  }

  fn remove(&mut self, object: u64) {
    let index = self
      .objects
      .iter()
      .position(|o| o.id == object)
      .unwrap_or_else(|| panic!("points object {object} is not in the scene"));
    self.objects.remove(index);
  }
}

fn uniform_layout_entry() -> wgpu::BindGroupLayoutEntry {
  wgpu::BindGroupLayoutEntry {
    binding: 0,
    visibility: wgpu::ShaderStages::VERTEX,
    ty: wgpu::BindingType::Buffer {
      ty: wgpu::BufferBindingType::Uniform,
      has_dynamic_offset: false,
      min_binding_size: None,
    },
    count: None,
  }
}

pub fn create_depth_view(device: &wgpu::Device, (width, height): (u32, u32)) -> wgpu::TextureView {
  let texture = device.create_texture(&wgpu::TextureDescriptor {
    label: Some("Depth Texture"),
    size: wgpu::Extent3d {
      width,
      height,
      depth_or_array_layers: 1,
    },
    mip_level_count: 1,
    sample_count: 1,
    dimension: wgpu::TextureDimension::D2,
    format: DEPTH_FORMAT,
    usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
    view_formats: &[],
  });
  texture.create_view(&wgpu::TextureViewDescriptor::default())
}
