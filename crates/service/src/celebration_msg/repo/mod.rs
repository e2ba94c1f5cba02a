pub mod seaorm;

pub use seaorm::SeaOrmCelebrationMsgRepository;
