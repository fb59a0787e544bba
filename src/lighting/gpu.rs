//! WebGPU compute backend
//!
//! One 16x16-workgroup dispatch per frame over the whole field, followed by
//! a blocking staging-buffer readback. Height levels are mirrored to the
//! device lazily: the upload happens only when the grid's generation counter
//! has moved since the last frame.

use bytemuck::Zeroable;
use glam::Vec2;
use wgpu::util::DeviceExt;

use super::LightingError;
use crate::consts::{LIGHT_LEVELS, MAX_RADIAL_LIGHTS, TORCH_HALF_ANGLE_DEG};
use crate::sim::grid::{Grid, HeightLevel};
use crate::sim::light::RadialLight;
use crate::sim::player::Torch;

/// One radial light in device layout
#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
struct GpuLight {
    position: [f32; 2],
    intensity: f32,
    radius: f32,
    height: i32,
    _pad: [i32; 3],
}

impl GpuLight {
    fn from_light(light: &RadialLight) -> Self {
        Self {
            position: light.position.to_array(),
            intensity: light.intensity,
            radius: light.radius,
            height: light.height,
            _pad: [0; 3],
        }
    }
}

/// Per-frame kernel parameters in device layout
#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
struct GpuParams {
    width: u32,
    height: u32,
    light_count: u32,
    torch_on: u32,
    torch_pos: [f32; 2],
    torch_dir: [f32; 2],
    torch_radius: f32,
    torch_cos_half: f32,
    torch_height: i32,
    max_level: f32,
}

/// Heights, levels, and staging buffers sized for a `width` x `height` field
fn create_field_buffers(
    device: &wgpu::Device,
    width: u32,
    height: u32,
) -> (wgpu::Buffer, wgpu::Buffer, wgpu::Buffer) {
    let field_bytes = u64::from(width) * u64::from(height) * std::mem::size_of::<i32>() as u64;
    let heights = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("lighting-heights"),
        size: field_bytes,
        usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });
    let levels = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("lighting-levels"),
        size: field_bytes,
        usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_SRC,
        mapped_at_creation: false,
    });
    let staging = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("lighting-staging"),
        size: field_bytes,
        usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
        mapped_at_creation: false,
    });
    (heights, levels, staging)
}

fn create_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    params: &wgpu::Buffer,
    lights: &wgpu::Buffer,
    heights: &wgpu::Buffer,
    levels: &wgpu::Buffer,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("lighting-bind-group"),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: params.as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: lights.as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 2,
                resource: heights.as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 3,
                resource: levels.as_entire_binding(),
            },
        ],
    })
}

pub struct GpuEvaluator {
    device: wgpu::Device,
    queue: wgpu::Queue,
    pipeline: wgpu::ComputePipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    bind_group: wgpu::BindGroup,
    params_buffer: wgpu::Buffer,
    lights_buffer: wgpu::Buffer,
    heights_buffer: wgpu::Buffer,
    levels_buffer: wgpu::Buffer,
    staging_buffer: wgpu::Buffer,
    width: u32,
    height: u32,
    /// Grid generation whose heights are currently on the device
    uploaded_generation: Option<u64>,
}

impl GpuEvaluator {
    pub fn new(width: u32, height: u32) -> Result<Self, LightingError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: None,
            force_fallback_adapter: false,
        }))
        .map_err(|err| LightingError::Init(format!("no adapter: {err}")))?;

        log::info!("lighting adapter: {:?}", adapter.get_info().name);

        let (device, queue) = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
            label: Some("lighting-device"),
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
            memory_hints: Default::default(),
            trace: Default::default(),
            experimental_features: Default::default(),
        }))
        .map_err(|err| LightingError::Init(format!("no device: {err}")))?;

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("lighting-shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shader.wgsl").into()),
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("lighting-bind-group-layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Storage { read_only: true },
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Storage { read_only: true },
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 3,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Storage { read_only: false },
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("lighting-pipeline-layout"),
            bind_group_layouts: &[&bind_group_layout],
            immediate_size: 0,
        });

        let pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("lighting-pipeline"),
            layout: Some(&pipeline_layout),
            module: &shader,
            entry_point: Some("main"),
            compilation_options: Default::default(),
            cache: None,
        });

        let params_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("lighting-params"),
            contents: bytemuck::bytes_of(&GpuParams::zeroed()),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let lights_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("lighting-lights"),
            size: (MAX_RADIAL_LIGHTS * std::mem::size_of::<GpuLight>()) as u64,
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let (heights_buffer, levels_buffer, staging_buffer) =
            create_field_buffers(&device, width, height);
        let bind_group = create_bind_group(
            &device,
            &bind_group_layout,
            &params_buffer,
            &lights_buffer,
            &heights_buffer,
            &levels_buffer,
        );

        Ok(Self {
            device,
            queue,
            pipeline,
            bind_group_layout,
            bind_group,
            params_buffer,
            lights_buffer,
            heights_buffer,
            levels_buffer,
            staging_buffer,
            width,
            height,
            uploaded_generation: None,
        })
    }

    /// Reallocate the field-sized buffers. Only dimension changes land here;
    /// ordinary terrain edits reuse the existing buffers.
    fn resize_field(&mut self, width: u32, height: u32) {
        let (heights, levels, staging) = create_field_buffers(&self.device, width, height);
        self.bind_group = create_bind_group(
            &self.device,
            &self.bind_group_layout,
            &self.params_buffer,
            &self.lights_buffer,
            &heights,
            &levels,
        );
        self.heights_buffer = heights;
        self.levels_buffer = levels;
        self.staging_buffer = staging;
        self.width = width;
        self.height = height;
        self.uploaded_generation = None;
    }

    fn frame_params(&self, lights: &[GpuLight], torch: &Torch, torch_on: bool) -> GpuParams {
        let dir = if torch.direction != Vec2::ZERO {
            torch.direction.normalize()
        } else {
            Vec2::X
        };
        GpuParams {
            width: self.width,
            height: self.height,
            light_count: lights.len() as u32,
            torch_on: u32::from(torch_on),
            torch_pos: torch.position.to_array(),
            torch_dir: dir.to_array(),
            torch_radius: torch.current_radius,
            torch_cos_half: TORCH_HALF_ANGLE_DEG.to_radians().cos(),
            torch_height: HeightLevel::Torch.level(),
            max_level: LIGHT_LEVELS as f32,
        }
    }

    /// Run one frame's kernel and read the integer light field back into
    /// `out`. Blocks until the readback completes.
    pub fn evaluate(
        &mut self,
        grid: &Grid,
        lights: &[RadialLight],
        torch: &Torch,
        torch_on: bool,
        out: &mut [i32],
    ) -> Result<(), LightingError> {
        if grid.width() != self.width || grid.height() != self.height {
            self.resize_field(grid.width(), grid.height());
        }

        if self.uploaded_generation != Some(grid.generation()) {
            self.queue.write_buffer(
                &self.heights_buffer,
                0,
                bytemuck::cast_slice(&grid.height_levels()),
            );
            self.uploaded_generation = Some(grid.generation());
        }

        let gpu_lights: Vec<GpuLight> = lights
            .iter()
            .take(MAX_RADIAL_LIGHTS)
            .map(GpuLight::from_light)
            .collect();
        if !gpu_lights.is_empty() {
            self.queue
                .write_buffer(&self.lights_buffer, 0, bytemuck::cast_slice(&gpu_lights));
        }
        let params = self.frame_params(&gpu_lights, torch, torch_on);
        self.queue
            .write_buffer(&self.params_buffer, 0, bytemuck::bytes_of(&params));

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("lighting-encoder"),
            });
        {
            let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some("lighting-pass"),
                timestamp_writes: None,
            });
            pass.set_pipeline(&self.pipeline);
            pass.set_bind_group(0, &self.bind_group, &[]);
            pass.dispatch_workgroups(self.width.div_ceil(16), self.height.div_ceil(16), 1);
        }
        encoder.copy_buffer_to_buffer(
            &self.levels_buffer,
            0,
            &self.staging_buffer,
            0,
            self.staging_buffer.size(),
        );
        self.queue.submit(Some(encoder.finish()));

        let slice = self.staging_buffer.slice(..);
        let (tx, rx) = std::sync::mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = tx.send(result);
        });
        self.device
            .poll(wgpu::PollType::wait_indefinitely())
            .map_err(|err| LightingError::Frame(format!("device poll: {err}")))?;
        rx.recv()
            .map_err(|_| LightingError::Frame("readback callback dropped".into()))?
            .map_err(|err| LightingError::Frame(format!("staging map: {err}")))?;

        {
            let data = slice.get_mapped_range();
            out.copy_from_slice(bytemuck::cast_slice(&data));
        }
        self.staging_buffer.unmap();

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // The WGSL structs are written against these exact layouts
    #[test]
    fn test_device_struct_sizes() {
        assert_eq!(std::mem::size_of::<GpuLight>(), 32);
        assert_eq!(std::mem::size_of::<GpuParams>(), 48);
    }

    #[test]
    fn test_light_conversion_layout() {
        let light = RadialLight {
            position: Vec2::new(3.0, 4.0),
            intensity: 2.5,
            radius: 11.0,
            velocity: Vec2::new(1.0, -1.0),
            height: 42,
        };
        let gpu = GpuLight::from_light(&light);
        assert_eq!(gpu.position, [3.0, 4.0]);
        assert_eq!(gpu.intensity, 2.5);
        assert_eq!(gpu.radius, 11.0);
        assert_eq!(gpu.height, 42);
    }
}
