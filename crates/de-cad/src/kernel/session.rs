//! Kernel sessions
//!
//! A session owns one kernel for the duration of one build and shuts it
//! down exactly once, on `close` or when dropped.

use crate::builder::{BuildResult, build_solid};
use crate::operation::SolidSpec;

use super::{Aabb, CadError, CadKernel, CadResult, MassProperties, Solid};

/// Exclusive, scoped ownership of a CAD kernel
pub struct KernelSession {
    kernel: Box<dyn CadKernel>,
    closed: bool,
}

impl KernelSession {
    /// Open a session, failing if the backend is not usable
    pub fn open(kernel: Box<dyn CadKernel>) -> CadResult<Self> {
        if !kernel.is_available() {
            return Err(CadError::KernelNotAvailable(format!(
                "Kernel '{}' is not available",
                kernel.name()
            )));
        }
        tracing::debug!(kernel = kernel.name(), "Opened kernel session");
        Ok(Self {
            kernel,
            closed: false,
        })
    }

    /// Run `f` inside a fresh session and tear the session down afterwards,
    /// whatever `f` returns
    pub fn scoped<T, E>(
        kernel: Box<dyn CadKernel>,
        f: impl FnOnce(&mut KernelSession) -> Result<T, E>,
    ) -> Result<T, E>
    where
        E: From<CadError>,
    {
        let mut session = Self::open(kernel)?;
        let result = f(&mut session);
        session.close();
        result
    }

    /// Name of the kernel backing this session
    pub fn kernel_name(&self) -> &str {
        self.kernel.name()
    }

    /// Direct access to the kernel
    pub fn kernel_mut(&mut self) -> &mut dyn CadKernel {
        self.kernel.as_mut()
    }

    /// Validate and build a solid
    pub fn build(&mut self, spec: &SolidSpec) -> BuildResult<Solid> {
        build_solid(self.kernel.as_mut(), spec)
    }

    /// Measure a solid built in this session
    pub fn measure(&self, solid: &Solid) -> CadResult<MassProperties> {
        self.kernel.measure(solid)
    }

    /// Bounds of a solid built in this session
    pub fn bounds(&self, solid: &Solid) -> CadResult<Aabb> {
        self.kernel.bounds(solid)
    }

    /// Shut the kernel down now
    pub fn close(mut self) {
        self.teardown();
    }

    fn teardown(&mut self) {
        if !self.closed {
            self.closed = true;
            self.kernel.shutdown();
            tracing::debug!(kernel = self.kernel.name(), "Closed kernel session");
        }
    }
}

impl Drop for KernelSession {
    fn drop(&mut self) {
        self.teardown();
    }
}
