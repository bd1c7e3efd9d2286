use bytemuck::Zeroable;

use crate::renderer::VertexRecord;

/// Outcome of an `append`. Overflow is the trigger for a flush cycle, not a
/// fault: nothing was written and the caller retries after flushing.
#[must_use]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WriteResult {
    Ok,
    Overflow,
}

/// Fixed-capacity staging arrays for one batch of vertex/index submissions.
///
/// Storage is allocated once at renderer init; `reset` only zeroes the write
/// cursors. Indices handed to `append` are relative to the appended vertex
/// run and are rebased against the current vertex cursor, so stored indices
/// can only ever reference vertices of the same unflushed batch.
///
/// Shadow-casting submissions additionally stage their rebased indices into
/// a parallel list, so the shadow passes can draw the casting subset of the
/// batch without touching the vertex array.
pub struct BatchBuffer {
    vertices: Box<[VertexRecord]>,
    indices: Box<[u32]>,
    shadow_indices: Box<[u32]>,
    vertex_count: u32,
    index_count: u32,
    shadow_index_count: u32,
}

impl BatchBuffer {
    pub fn new(max_vertices: u32, max_indices: u32) -> Self {
        Self {
            vertices: vec![VertexRecord::zeroed(); max_vertices as usize].into_boxed_slice(),
            indices: vec![0u32; max_indices as usize].into_boxed_slice(),
            shadow_indices: vec![0u32; max_indices as usize].into_boxed_slice(),
            vertex_count: 0,
            index_count: 0,
            shadow_index_count: 0,
        }
    }

    /// Zeroes the write cursors. Idempotent; no GPU side effects.
    pub fn reset(&mut self) {
        self.vertex_count = 0;
        self.index_count = 0;
        self.shadow_index_count = 0;
    }

    /// Copies the records at the current cursors, or returns `Overflow`
    /// without writing anything if either array would exceed capacity. A
    /// record group is never split across batches. When `casts_shadows` is
    /// set the rebased indices are also staged for the shadow passes.
    pub fn append(
        &mut self,
        vertices: &[VertexRecord],
        indices: &[u32],
        casts_shadows: bool,
    ) -> WriteResult {
        let vertex_count = vertices.len() as u32;
        let index_count = indices.len() as u32;

        if self.vertex_count + vertex_count > self.max_vertices()
            || self.index_count + index_count > self.max_indices()
        {
            return WriteResult::Overflow;
        }

        let base = self.vertex_count;
        self.vertices[base as usize..(base + vertex_count) as usize].copy_from_slice(vertices);
        self.vertex_count += vertex_count;

        for (dst, &src) in self.indices[self.index_count as usize..]
            .iter_mut()
            .zip(indices)
        {
            *dst = base + src;
        }
        self.index_count += index_count;

        if casts_shadows {
            // The shadow list is a subset of the main one, so it can never
            // overflow before the check above fires.
            for (dst, &src) in self.shadow_indices[self.shadow_index_count as usize..]
                .iter_mut()
                .zip(indices)
            {
                *dst = base + src;
            }
            self.shadow_index_count += index_count;
        }

        WriteResult::Ok
    }

    /// Read-only views of the filled regions, for the pipeline upload step.
    pub fn snapshot(&self) -> (&[VertexRecord], &[u32]) {
        (
            &self.vertices[..self.vertex_count as usize],
            &self.indices[..self.index_count as usize],
        )
    }

    /// The staged indices of shadow-casting submissions only.
    pub fn shadow_snapshot(&self) -> &[u32] {
        &self.shadow_indices[..self.shadow_index_count as usize]
    }

    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }

    pub fn index_count(&self) -> u32 {
        self.index_count
    }

    pub fn shadow_index_count(&self) -> u32 {
        self.shadow_index_count
    }

    pub fn is_empty(&self) -> bool {
        self.vertex_count == 0
    }

    pub fn max_vertices(&self) -> u32 {
        self.vertices.len() as u32
    }

    pub fn max_indices(&self) -> u32 {
        self.indices.len() as u32
    }
}
