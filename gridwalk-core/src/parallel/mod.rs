pub mod ensembles;
