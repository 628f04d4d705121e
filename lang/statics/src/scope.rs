use indexmap::IndexMap;
use lscript_syntax::*;
use lscript_utils::arena::ArenaDense;

/// How a name came to be declared.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    /// the name of a function, visible inside its own body
    SelfName,
    Param,
    /// declared in a function frame without being passed in
    Local,
    /// never declared; auto-declared in the root frame
    Implicit,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Binding {
    pub name: VarName,
    pub frame: FrameId,
    pub role: Role,
    /// first parameter of its function, the continuation slot after CPS
    pub cont: bool,
    /// every site that resolves here, assignment targets included
    pub refs: Vec<SiteId>,
    pub assigned: usize,
}

impl Binding {
    /// Written to but never read.
    pub fn is_dead_store(&self) -> bool {
        self.refs.len() == self.assigned
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    pub parent: Option<FrameId>,
    pub names: IndexMap<VarName, BindingId>,
}

/// Result of one resolution pass. Stale as soon as the tree changes.
#[derive(Clone, Debug, PartialEq)]
pub struct Scope {
    pub frames: ArenaDense<FrameId, Frame>,
    pub bindings: ArenaDense<BindingId, Binding>,
    pub sites: ArenaDense<SiteId, BindingId>,
    pub root: FrameId,
}

impl Default for Scope {
    fn default() -> Self {
        Self::new()
    }
}

impl Scope {
    pub fn new() -> Self {
        let mut frames = ArenaDense::new();
        let root = frames.alloc(Frame { parent: None, names: IndexMap::new() });
        Scope { frames, bindings: ArenaDense::new(), sites: ArenaDense::new(), root }
    }

    pub fn open(&mut self, parent: FrameId) -> FrameId {
        self.frames.alloc(Frame { parent: Some(parent), names: IndexMap::new() })
    }

    /// Declares `name` in `frame`, shadowing an earlier declaration there.
    pub fn declare(&mut self, frame: FrameId, name: &VarName, role: Role, cont: bool) -> BindingId {
        let binding = Binding {
            name: name.clone(),
            frame,
            role,
            cont,
            refs: Vec::new(),
            assigned: 0,
        };
        let id = self.bindings.alloc(binding);
        self.frames[&frame].names.insert(name.clone(), id);
        id
    }

    /// Walks outward from `frame`.
    pub fn lookup(&self, frame: FrameId, name: &VarName) -> Option<BindingId> {
        let mut cur = Some(frame);
        while let Some(id) = cur {
            let frame = &self.frames[&id];
            if let Some(binding) = frame.names.get(name) {
                return Some(*binding);
            }
            cur = frame.parent;
        }
        None
    }

    pub fn binding(&self, id: &BindingId) -> &Binding {
        &self.bindings[id]
    }

    /// The binding a resolved variable points to.
    pub fn resolved(&self, var: &Var) -> Option<&Binding> {
        let site = var.site?;
        Some(&self.bindings[self.sites.get(&site)?])
    }

    pub fn parent(&self, frame: FrameId) -> Option<FrameId> {
        self.frames[&frame].parent
    }

    pub fn is_root(&self, frame: FrameId) -> bool {
        frame == self.root
    }

    pub fn visible(&self, frame: FrameId, name: &VarName) -> bool {
        self.lookup(frame, name).is_some()
    }

    /// Auto-declared globals in first-seen order.
    pub fn implicits(&self) -> impl Iterator<Item = &Binding> {
        self.frames[&self.root].names.values().map(|id| &self.bindings[id])
    }
}
