use crate::{
    graph::node::{GraphNode, RenderCtx},
    MAX_BLOCK_SIZE,
};

/*
Parallel Signal Mixing
======================

Linear crossfade between two sources:

    output = A × (1 - balance) + B × balance

  balance = 0.0 → all A
  balance = 0.5 → half of each
  balance = 1.0 → all B

Chained mixes build a weighted partial stack. To land at weights 0.6 / 0.25 /
0.15 for f / 2f / 1.5f:

  OscNode::sine()
      .mix(OscNode::sine().with_ratio(2.0), 0.25 / 0.85)   // f : 2f = 0.6 : 0.25
      .mix(OscNode::sine().with_ratio(1.5), 0.15)          // scale both by 0.85

Both sources receive note events. Put the envelope after the mix so it gates
the whole stack:

  stack.amplify(env)
*/

pub struct Mix<A, B> {
    pub source_a: A,
    pub source_b: B,
    pub balance: f32,
    temp_buffer: Vec<f32>,
}

impl<A, B> Mix<A, B> {
    pub fn new(source_a: A, source_b: B, balance: f32) -> Self {
        Mix {
            source_a,
            source_b,
            balance: balance.clamp(0.0, 1.0),
            temp_buffer: vec![0.0; MAX_BLOCK_SIZE],
        }
    }
}

impl<S: GraphNode, M: GraphNode> GraphNode for Mix<S, M> {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        self.source_a.render_block(out, ctx);

        let frames = &mut self.temp_buffer[..out.len()];
        frames.fill(0.0);
        self.source_b.render_block(frames, ctx);

        let weight_a = 1.0 - self.balance;
        let weight_b = self.balance;
        for (o, b) in out.iter_mut().zip(frames.iter()) {
            *o = (*o * weight_a) + (*b * weight_b);
        }
    }

    fn note_on(&mut self, ctx: &RenderCtx) {
        self.source_a.note_on(ctx);
        self.source_b.note_on(ctx);
    }

    fn note_off(&mut self, ctx: &RenderCtx) {
        self.source_a.note_off(ctx);
        self.source_b.note_off(ctx);
    }

    fn is_active(&self) -> bool {
        self.source_a.is_active() || self.source_b.is_active()
    }
}
