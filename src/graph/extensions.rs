use crate::graph::{
    amplify::Amplify,
    mix::Mix,
    modulate::Modulate,
    node::{GraphNode, Modulatable},
    through::Through,
};

/// Fluent combinators for building voice graphs.
pub trait NodeExt: GraphNode + Sized {
    fn amplify<M: GraphNode>(self, modulator: M) -> Amplify<Self, M> {
        Amplify::new(self, modulator)
    }

    fn through<F: GraphNode>(self, filter: F) -> Through<Self, F> {
        Through::new(self, filter)
    }

    fn modulate<M: GraphNode>(
        self,
        lfo: M,
        param: <Self as Modulatable>::Param,
        depth: f32,
    ) -> Modulate<Self, M>
    where
        Self: Modulatable,
    {
        Modulate::new(self, lfo, param, depth)
    }

    fn mix<M: GraphNode>(self, source: M, balance: f32) -> Mix<Self, M> {
        Mix::new(self, source, balance)
    }

    /// Type-erase the graph so differently shaped voices share one type.
    fn boxed(self) -> Box<dyn GraphNode>
    where
        Self: 'static,
    {
        Box::new(self)
    }
}

impl<T: GraphNode> NodeExt for T {}
