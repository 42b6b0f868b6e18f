use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;

use anyhow::{anyhow, bail, Context, Result};
use image::imageops::FilterType;
use image::RgbaImage;

/// Matches the textured-quad shader's layer count.
pub const MAX_TEXTURE_SLOTS: u32 = 8;
/// Every slot is one layer of this extent; uploads are resized to fit.
pub const SLOT_EXTENT: u32 = 128;

/// Name to slot-index mapping with upload-readiness tracking. Kept separate
/// from the GPU objects so frame encoding can be tested without a device.
#[derive(Default)]
pub struct SlotRegistry {
    entries: HashMap<String, SlotEntry>,
    next: u32,
}

struct SlotEntry {
    index: u32,
    ready: bool,
}

impl SlotRegistry {
    /// Assigns the next sequential slot. Re-registering an existing name is
    /// a no-op returning the already assigned slot.
    pub fn register(&mut self, name: &str) -> Result<(u32, bool)> {
        if let Some(entry) = self.entries.get(name) {
            return Ok((entry.index, false));
        }
        if self.next >= MAX_TEXTURE_SLOTS {
            bail!("texture slots exhausted ({MAX_TEXTURE_SLOTS} max)");
        }
        let index = self.next;
        self.next += 1;
        self.entries
            .insert(name.to_owned(), SlotEntry { index, ready: false });
        Ok((index, true))
    }

    pub fn lookup(&self, name: &str) -> Result<u32> {
        self.entries
            .get(name)
            .map(|e| e.index)
            .ok_or_else(|| anyhow!("texture '{name}' is not registered"))
    }

    pub fn is_ready(&self, name: &str) -> bool {
        self.entries.get(name).map_or(false, |e| e.ready)
    }

    fn mark_ready(&mut self, index: u32) {
        if let Some(entry) = self.entries.values_mut().find(|e| e.index == index) {
            entry.ready = true;
        }
    }
}

struct Decoded {
    name: String,
    slot: u32,
    pixels: Result<RgbaImage>,
}

/// Slot registry plus the GPU-resident texture array the quad program
/// samples. Image decoding runs off-thread; `pump` drains finished decodes
/// into the array so rendering never blocks on a pending upload.
pub struct TextureAtlas {
    registry: SlotRegistry,
    texture: wgpu::Texture,
    bind_group: wgpu::BindGroup,
    layout: wgpu::BindGroupLayout,
    decoded_tx: mpsc::Sender<Decoded>,
    decoded_rx: mpsc::Receiver<Decoded>,
}

impl TextureAtlas {
    pub fn new(device: &wgpu::Device) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("atlas-array"),
            size: wgpu::Extent3d {
                width: SLOT_EXTENT,
                height: SLOT_EXTENT,
                depth_or_array_layers: MAX_TEXTURE_SLOTS,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor {
            dimension: Some(wgpu::TextureViewDimension::D2Array),
            ..Default::default()
        });
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("atlas-sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });
        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("atlas-layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2Array,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("atlas-bg"),
            layout: &layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&sampler),
                },
            ],
        });
        let (decoded_tx, decoded_rx) = mpsc::channel();
        Self {
            registry: SlotRegistry::default(),
            texture,
            bind_group,
            layout,
            decoded_tx,
            decoded_rx,
        }
    }

    /// Registers a named image file. The returned slot index is usable for
    /// draw encoding immediately; pixel data is decoded on a background
    /// thread and uploaded by a later `pump`.
    pub fn register(&mut self, name: &str, path: impl Into<PathBuf>) -> Result<u32> {
        let (slot, fresh) = self.registry.register(name)?;
        if !fresh {
            return Ok(slot);
        }
        let path = path.into();
        let tx = self.decoded_tx.clone();
        let name = name.to_owned();
        thread::spawn(move || {
            let pixels = image::open(&path)
                .with_context(|| format!("loading {}", path.display()))
                .map(|img| img.to_rgba8());
            // receiver gone means the atlas was dropped; nothing to do
            let _ = tx.send(Decoded { name, slot, pixels });
        });
        Ok(slot)
    }

    /// Registers already-decoded pixel data (procedural sprites, embedded
    /// assets). Uploaded by the next `pump` like any other source.
    pub fn register_pixels(&mut self, name: &str, pixels: RgbaImage) -> Result<u32> {
        let (slot, fresh) = self.registry.register(name)?;
        if fresh {
            let _ = self.decoded_tx.send(Decoded {
                name: name.to_owned(),
                slot,
                pixels: Ok(pixels),
            });
        }
        Ok(slot)
    }

    /// Drains finished decodes into the texture array. Failed loads are
    /// logged and their slot simply never becomes ready.
    pub fn pump(&mut self, queue: &wgpu::Queue) {
        let decoded: Vec<Decoded> = self.decoded_rx.try_iter().collect();
        for d in decoded {
            let img = match d.pixels {
                Ok(img) => img,
                Err(e) => {
                    log::error!("texture '{}' failed to load: {e:#}", d.name);
                    continue;
                }
            };
            let img = if img.dimensions() == (SLOT_EXTENT, SLOT_EXTENT) {
                img
            } else {
                image::imageops::resize(&img, SLOT_EXTENT, SLOT_EXTENT, FilterType::Triangle)
            };
            queue.write_texture(
                wgpu::ImageCopyTexture {
                    texture: &self.texture,
                    mip_level: 0,
                    origin: wgpu::Origin3d {
                        x: 0,
                        y: 0,
                        z: d.slot,
                    },
                    aspect: wgpu::TextureAspect::All,
                },
                &img,
                wgpu::ImageDataLayout {
                    offset: 0,
                    bytes_per_row: Some(4 * SLOT_EXTENT),
                    rows_per_image: Some(SLOT_EXTENT),
                },
                wgpu::Extent3d {
                    width: SLOT_EXTENT,
                    height: SLOT_EXTENT,
                    depth_or_array_layers: 1,
                },
            );
            self.registry.mark_ready(d.slot);
            log::debug!("texture '{}' uploaded to slot {}", d.name, d.slot);
        }
    }

    pub fn lookup(&self, name: &str) -> Result<u32> {
        self.registry.lookup(name)
    }

    pub fn is_ready(&self, name: &str) -> bool {
        self.registry.is_ready(name)
    }

    pub fn slots(&self) -> &SlotRegistry {
        &self.registry
    }

    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }

    pub fn layout(&self) -> &wgpu::BindGroupLayout {
        &self.layout
    }
}
