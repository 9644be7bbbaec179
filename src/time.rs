pub type Hertz = fugit::HertzU32;
