#![cfg(test)]

mod support;

mod probe {
    mod integration;
}

mod pipeline {
    mod integration;
}
