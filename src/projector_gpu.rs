use crate::{
    error::{EquicubeError, EquicubeResult},
    face::Face,
    projector::ProjectorBackend,
    raster::{Channels, FaceImage, SourceImage},
};

/// Reference tile size; one invocation per destination pixel.
const WORKGROUP_SIZE: u32 = 16;

/// The same math as the cpu path, restructured as one invocation per
/// destination pixel. The source texel is picked with `textureLoad` at a
/// manually truncated-and-clamped integer coordinate so the sampling rule
/// stays bit-identical to `mapping::source_texel` (no sampler, no
/// filtering).
///
/// Byte parity with the cpu path additionally assumes the driver's
/// `atan2`/`asin`/`normalize` agree with Rust's f32 intrinsics at every
/// sampled coordinate; WGSL permits several ulps of error there, so on
/// some hardware a fractional coordinate sitting exactly on a truncation
/// boundary can flip to the neighboring texel.
const KERNEL: &str = r#"
struct Params {
    face_id: u32,
    face_size: u32,
    _pad0: u32,
    _pad1: u32,
};

@group(0) @binding(0) var source_tex: texture_2d<f32>;
@group(0) @binding(1) var dest_tex: texture_storage_2d<rgba8unorm, write>;
@group(0) @binding(2) var<uniform> params: Params;

const PI: f32 = 3.14159265358979;

@compute @workgroup_size(16, 16, 1)
fn project(@builtin(global_invocation_id) gid: vec3<u32>) {
    // Trailing partial tiles must no-op past the face bounds.
    if (gid.x >= params.face_size || gid.y >= params.face_size) {
        return;
    }

    let n = f32(params.face_size);
    let u = 2.0 * (f32(gid.x) + 0.5) / n - 1.0;
    let v = 2.0 * (f32(gid.y) + 0.5) / n - 1.0;

    var dir: vec3<f32>;
    switch params.face_id {
        case 0u: { dir = vec3<f32>(1.0, -v, -u); }
        case 1u: { dir = vec3<f32>(-1.0, -v, u); }
        case 2u: { dir = vec3<f32>(u, 1.0, v); }
        case 3u: { dir = vec3<f32>(u, -1.0, -v); }
        case 4u: { dir = vec3<f32>(u, -v, 1.0); }
        default: { dir = vec3<f32>(-u, -v, -1.0); }
    }
    dir = normalize(dir);

    let lon = atan2(dir.x, dir.z);
    let lat = asin(clamp(dir.y, -1.0, 1.0));

    let dims = vec2<f32>(textureDimensions(source_tex));
    let sx = (lon + PI) / (2.0 * PI) * dims.x;
    let sy = (0.5 * PI - lat) / PI * dims.y;
    let tx = clamp(i32(sx), 0, i32(dims.x) - 1);
    let ty = clamp(i32(sy), 0, i32(dims.y) - 1);

    let color = textureLoad(source_tex, vec2<i32>(tx, ty), 0);
    textureStore(dest_tex, gid.xy, color);
}
"#;

/// Uniform layout: `face_id: u32, face_size: u32` plus padding to 16 bytes.
const PARAMS_SIZE: u64 = 16;

fn encode_params(face: Face, face_size: u32) -> [u8; PARAMS_SIZE as usize] {
    let mut bytes = [0u8; PARAMS_SIZE as usize];
    bytes[0..4].copy_from_slice(&(face.index() as u32).to_le_bytes());
    bytes[4..8].copy_from_slice(&face_size.to_le_bytes());
    bytes
}

/// Data-parallel projector on a wgpu compute queue.
///
/// Adapter, device and the compiled kernel are acquired once in [`new`];
/// per-face textures and the readback buffer live only for a single
/// `project_face` call. Each face's destination texture is exclusively
/// written by that face's dispatch and read back in full after the queue
/// round-trip completes.
///
/// [`new`]: GpuProjector::new
pub struct GpuProjector {
    device: wgpu::Device,
    queue: wgpu::Queue,
    pipeline: wgpu::ComputePipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    params: wgpu::Buffer,
}

impl GpuProjector {
    pub fn new() -> EquicubeResult<Self> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: None,
            force_fallback_adapter: false,
        }))
        .map_err(|e| match e {
            wgpu::RequestAdapterError::NotFound { .. } => {
                EquicubeError::gpu("no gpu adapter available")
            }
            other => EquicubeError::gpu(format!("wgpu request_adapter failed: {other:?}")),
        })?;

        tracing::debug!(adapter = ?adapter.get_info().name, "acquired gpu adapter");

        let (device, queue) = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
            label: None,
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
            experimental_features: wgpu::ExperimentalFeatures::default(),
            memory_hints: wgpu::MemoryHints::Performance,
            trace: wgpu::Trace::Off,
        }))
        .map_err(|e| EquicubeError::gpu(format!("wgpu request_device failed: {e:?}")))?;

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("equicube_project_kernel"),
            source: wgpu::ShaderSource::Wgsl(KERNEL.into()),
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("equicube_project_bgl"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Texture {
                        multisampled: false,
                        view_dimension: wgpu::TextureViewDimension::D2,
                        sample_type: wgpu::TextureSampleType::Float { filterable: false },
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::StorageTexture {
                        access: wgpu::StorageTextureAccess::WriteOnly,
                        format: wgpu::TextureFormat::Rgba8Unorm,
                        view_dimension: wgpu::TextureViewDimension::D2,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: std::num::NonZeroU64::new(PARAMS_SIZE),
                    },
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("equicube_project_pl"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("equicube_project_pipeline"),
            layout: Some(&pipeline_layout),
            module: &shader,
            entry_point: Some("project"),
            compilation_options: wgpu::PipelineCompilationOptions::default(),
            cache: None,
        });

        let params = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("equicube_face_params"),
            size: PARAMS_SIZE,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        Ok(Self {
            device,
            queue,
            pipeline,
            bind_group_layout,
            params,
        })
    }

    /// Uploads the panorama as an rgba8 texture. Rgb sources get an opaque
    /// alpha lane; it is stripped again on readback.
    fn upload_source(&self, source: &SourceImage) -> wgpu::Texture {
        let (w, h) = (source.width(), source.height());
        let rgba: std::borrow::Cow<'_, [u8]> = match source.channels() {
            Channels::Rgba => source.data().into(),
            Channels::Rgb => {
                let mut buf = Vec::with_capacity(w as usize * h as usize * 4);
                for px in source.data().chunks_exact(3) {
                    buf.extend_from_slice(px);
                    buf.push(255);
                }
                buf.into()
            }
        };

        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("equicube_source"),
            size: wgpu::Extent3d {
                width: w,
                height: h,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        self.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &rgba,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(w * 4),
                rows_per_image: Some(h),
            },
            wgpu::Extent3d {
                width: w,
                height: h,
                depth_or_array_layers: 1,
            },
        );

        texture
    }
}

impl ProjectorBackend for GpuProjector {
    fn project_face(
        &mut self,
        source: &SourceImage,
        face: Face,
        face_size: u32,
    ) -> EquicubeResult<FaceImage> {
        let source_tex = self.upload_source(source);
        let source_view = source_tex.create_view(&wgpu::TextureViewDescriptor::default());

        let dest_tex = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("equicube_face"),
            size: wgpu::Extent3d {
                width: face_size,
                height: face_size,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8Unorm,
            usage: wgpu::TextureUsages::STORAGE_BINDING | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let dest_view = dest_tex.create_view(&wgpu::TextureViewDescriptor::default());

        let bytes_per_row_unpadded = face_size
            .checked_mul(4)
            .ok_or_else(|| EquicubeError::gpu("face size overflows the readback row"))?;
        let bytes_per_row = align_to(bytes_per_row_unpadded, wgpu::COPY_BYTES_PER_ROW_ALIGNMENT);
        let readback_size = (bytes_per_row as u64)
            .checked_mul(u64::from(face_size))
            .ok_or_else(|| EquicubeError::gpu("readback buffer size overflow"))?;
        let readback = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("equicube_readback"),
            size: readback_size,
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        self.queue
            .write_buffer(&self.params, 0, &encode_params(face, face_size));

        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("equicube_project_bg"),
            layout: &self.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&source_view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&dest_view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: self.params.as_entire_binding(),
                },
            ],
        });

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("equicube_project_encoder"),
            });

        {
            let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some("equicube_project_pass"),
                timestamp_writes: None,
            });
            pass.set_pipeline(&self.pipeline);
            pass.set_bind_group(0, &bind_group, &[]);
            let groups = face_size.div_ceil(WORKGROUP_SIZE);
            pass.dispatch_workgroups(groups, groups, 1);
        }

        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                texture: &dest_tex,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &readback,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(bytes_per_row),
                    rows_per_image: Some(face_size),
                },
            },
            wgpu::Extent3d {
                width: face_size,
                height: face_size,
                depth_or_array_layers: 1,
            },
        );
        self.queue.submit(Some(encoder.finish()));

        // Full barrier: the buffer maps only after every invocation of this
        // face's dispatch has completed.
        let buffer_slice = readback.slice(..);
        let (tx, rx) = std::sync::mpsc::channel();
        buffer_slice.map_async(wgpu::MapMode::Read, move |res| {
            let _ = tx.send(res);
        });
        self.device
            .poll(wgpu::PollType::wait_indefinitely())
            .map_err(|e| EquicubeError::gpu(format!("wgpu poll failed: {e:?}")))?;
        rx.recv()
            .map_err(|_| EquicubeError::gpu("readback channel closed"))?
            .map_err(|e| EquicubeError::gpu(format!("readback map failed: {e:?}")))?;

        let mapped = buffer_slice.get_mapped_range();
        let mut out = FaceImage::new(face_size, source.channels());
        let row_bytes = face_size as usize * 4;
        let padded_row_bytes = bytes_per_row as usize;
        let mut write = 0usize;
        for row in 0..face_size as usize {
            let line = &mapped[row * padded_row_bytes..row * padded_row_bytes + row_bytes];
            match source.channels() {
                Channels::Rgba => {
                    out.data[write..write + row_bytes].copy_from_slice(line);
                    write += row_bytes;
                }
                Channels::Rgb => {
                    for px in line.chunks_exact(4) {
                        out.data[write..write + 3].copy_from_slice(&px[..3]);
                        write += 3;
                    }
                }
            }
        }
        drop(mapped);
        readback.unmap();

        Ok(out)
    }
}

fn align_to(value: u32, alignment: u32) -> u32 {
    let mask = alignment - 1;
    (value + mask) & !mask
}
