use std::{
    hash::Hash,
    ops::{Index, IndexMut},
};

/* ---------------------------------- Index --------------------------------- */

pub use crate::new_key_type;

/// A dense handle into an arena.
pub trait IndexLike: Clone + Copy + Eq + Hash {
    fn new(idx: usize) -> Self;
    fn index(&self) -> usize;
}

#[macro_export]
macro_rules! new_key_type {
    ( $(#[$outer:meta])* $vis:vis struct $name:ident ; $($rest:tt)* ) => {
        $(#[$outer])*
        #[derive(Copy, Clone, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
        $vis struct $name(usize);

        impl $crate::arena::IndexLike for $name {
            fn new(idx: usize) -> Self {
                Self(idx)
            }
            fn index(&self) -> usize {
                self.0
            }
        }

        impl std::fmt::Debug for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl $name {
            pub fn concise(&self) -> String {
                format!("#{}", self.0)
            }
        }

        $crate::new_key_type!($($rest)*);
    };

    () => {}
}

/* ---------------------------------- Arena --------------------------------- */

/// Append-only storage addressed by the handles it hands out.
#[derive(Debug, Clone, PartialEq)]
pub struct ArenaDense<Id, T> {
    vec: Vec<T>,
    _marker: std::marker::PhantomData<Id>,
}

mod impls {
    use super::*;

    /* ------------------------------- ArenaDense ------------------------------- */

    impl<Id, T> Default for ArenaDense<Id, T> {
        fn default() -> Self {
            Self { vec: Vec::new(), _marker: std::marker::PhantomData }
        }
    }

    impl<Id: IndexLike, T> ArenaDense<Id, T> {
        pub fn new() -> Self {
            Self::default()
        }
        pub fn alloc(&mut self, val: T) -> Id {
            let id = Id::new(self.vec.len());
            self.vec.push(val);
            id
        }
        pub fn get(&self, id: &Id) -> Option<&T> {
            self.vec.get(id.index())
        }
        pub fn get_mut(&mut self, id: &Id) -> Option<&mut T> {
            self.vec.get_mut(id.index())
        }
        pub fn len(&self) -> usize {
            self.vec.len()
        }
        pub fn is_empty(&self) -> bool {
            self.vec.is_empty()
        }
        pub fn iter(&self) -> impl Iterator<Item = (Id, &T)> {
            self.vec.iter().enumerate().map(|(i, t)| (Id::new(i), t))
        }
    }

    impl<Id: IndexLike, T> Index<&Id> for ArenaDense<Id, T> {
        type Output = T;
        fn index(&self, id: &Id) -> &Self::Output {
            &self.vec[id.index()]
        }
    }
    impl<Id: IndexLike, T> IndexMut<&Id> for ArenaDense<Id, T> {
        fn index_mut(&mut self, id: &Id) -> &mut Self::Output {
            &mut self.vec[id.index()]
        }
    }
}
