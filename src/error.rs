//! Error types for swell.
//!
//! This module provides error types for configuration validation, particle
//! bookkeeping, and GPU initialization.

use std::fmt;

/// Errors raised when setup parameters violate a precondition.
///
/// Configuration faults are programming errors, not transient conditions:
/// they fail fast at setup and are never silently clamped.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Window width or height is zero.
    EmptyWindow,
    /// The grid is too small to form a triangle strip.
    GridTooSmall {
        /// Requested row count.
        rows: u32,
        /// Line count after the 3/4 depth scale.
        effective_lines: u32,
    },
    /// A particle system with zero particles was requested.
    NoParticles,
    /// A life-cycle bound range has min > max.
    InvertedLifeBounds {
        /// Name of the offending range.
        which: &'static str,
        /// Lower bound.
        min: f32,
        /// Upper bound.
        max: f32,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::EmptyWindow => {
                write!(f, "Window dimensions must be non-zero")
            }
            ConfigError::GridTooSmall { rows, effective_lines } => write!(
                f,
                "Wave grid needs at least 2 rows and 2 effective lines, got {} x {}",
                rows, effective_lines
            ),
            ConfigError::NoParticles => {
                write!(f, "Particle count must be at least 1")
            }
            ConfigError::InvertedLifeBounds { which, min, max } => write!(
                f,
                "Life-cycle bound {} has min {} > max {}",
                which, min, max
            ),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Errors raised by particle collection operations.
#[derive(Debug, Clone, PartialEq)]
pub enum ParticleError {
    /// The requested particle id is not in the collection.
    NotFound(u32),
}

impl fmt::Display for ParticleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParticleError::NotFound(id) => {
                write!(f, "Particle {} is not in the collection", id)
            }
        }
    }
}

impl std::error::Error for ParticleError {}

/// Errors that can occur during GPU initialization.
#[derive(Debug)]
pub enum GpuError {
    /// Failed to create a surface for rendering.
    SurfaceCreation(wgpu::CreateSurfaceError),
    /// No compatible GPU adapter found.
    NoAdapter,
    /// Failed to create GPU device.
    DeviceCreation(wgpu::RequestDeviceError),
}

impl fmt::Display for GpuError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GpuError::SurfaceCreation(e) => write!(f, "Failed to create GPU surface: {}", e),
            GpuError::NoAdapter => write!(
                f,
                "No compatible GPU adapter found. Ensure your system has a GPU with WebGPU/Vulkan/Metal/DX12 support."
            ),
            GpuError::DeviceCreation(e) => write!(f, "Failed to create GPU device: {}", e),
        }
    }
}

impl std::error::Error for GpuError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GpuError::SurfaceCreation(e) => Some(e),
            GpuError::DeviceCreation(e) => Some(e),
            GpuError::NoAdapter => None,
        }
    }
}

impl From<wgpu::CreateSurfaceError> for GpuError {
    fn from(e: wgpu::CreateSurfaceError) -> Self {
        GpuError::SurfaceCreation(e)
    }
}

impl From<wgpu::RequestDeviceError> for GpuError {
    fn from(e: wgpu::RequestDeviceError) -> Self {
        GpuError::DeviceCreation(e)
    }
}

/// Errors that can occur when running the visualizer application.
#[derive(Debug)]
pub enum AppError {
    /// Failed to create event loop.
    EventLoop(winit::error::EventLoopError),
    /// Failed to create window.
    Window(winit::error::OsError),
    /// GPU initialization failed.
    Gpu(GpuError),
    /// Setup parameters were invalid.
    Config(ConfigError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::EventLoop(e) => write!(f, "Failed to create event loop: {}", e),
            AppError::Window(e) => write!(f, "Failed to create window: {}", e),
            AppError::Gpu(e) => write!(f, "GPU error: {}", e),
            AppError::Config(e) => write!(f, "Configuration error: {}", e),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::EventLoop(e) => Some(e),
            AppError::Window(e) => Some(e),
            AppError::Gpu(e) => Some(e),
            AppError::Config(e) => Some(e),
        }
    }
}

impl From<winit::error::EventLoopError> for AppError {
    fn from(e: winit::error::EventLoopError) -> Self {
        AppError::EventLoop(e)
    }
}

impl From<winit::error::OsError> for AppError {
    fn from(e: winit::error::OsError) -> Self {
        AppError::Window(e)
    }
}

impl From<GpuError> for AppError {
    fn from(e: GpuError) -> Self {
        AppError::Gpu(e)
    }
}

impl From<ConfigError> for AppError {
    fn from(e: ConfigError) -> Self {
        AppError::Config(e)
    }
}
