/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! The execution engine: the bounded [stack], call [frame]s with their
//! spending scopes, and the fetch-decode-execute [machine].

pub(crate) mod frame;
pub(crate) mod machine;
pub(crate) mod stack;
